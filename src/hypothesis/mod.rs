mod tl2;

pub use tl2::{TL2Test, TL2TestResult};
