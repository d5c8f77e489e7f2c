//! The monotone-lattice decision engine: the three-valued `TriSet` store
//! built on top of `lattice-core`'s `Point` and `HomoSet`.

mod queue;
mod tri_set;

pub use tri_set::TriSet;
