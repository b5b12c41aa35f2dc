//! FIRST/FOLLOW sets, LL(1) prediction tables, and LR item-set automata with
//! SLR(1) and canonical-LR(1) parse-table construction (C4/C5).

pub mod first_follow;
pub mod items;
pub mod ll1;
pub mod prod;
pub mod table;

pub use first_follow::{compute_first, compute_follow, FirstSets};
pub use items::{closure_lr0, closure_lr1, Item, ItemSet};
pub use ll1::{build_ll1, LL1Conflict, LL1Table};
pub use prod::{all_productions, prod_len, prod_symbols, render_production, ProdId};
pub use table::{build_parse_table, Action, BuildMethod, ParseTable, TableError};
