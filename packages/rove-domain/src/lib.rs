mod authorization;
mod category;
mod geo;
mod location;
mod page;
mod session;
pub mod time_serde;

pub use authorization::{AuthorizationState, PositionSample};
pub use category::Category;
pub use geo::{Coordinate, GridCell};
pub use location::{CandidateLocation, SavedLocation, format_address};
pub use page::paginate;
pub use session::VisitSession;
