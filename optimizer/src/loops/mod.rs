pub mod strength_reduce;
