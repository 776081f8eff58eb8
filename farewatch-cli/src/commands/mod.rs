pub mod add;
pub mod lookup;
pub mod sync;
