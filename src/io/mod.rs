pub mod avl;
pub mod csv;
