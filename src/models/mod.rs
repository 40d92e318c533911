pub mod records;
pub mod response;
pub mod rotation;
pub mod weather;
pub mod yields;

pub use records::*;
pub use response::*;
pub use rotation::*;
pub use weather::*;
pub use yields::*;
