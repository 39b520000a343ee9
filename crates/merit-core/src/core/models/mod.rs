pub mod cell;
pub mod defect;
pub mod layout;
pub mod truth_table;
