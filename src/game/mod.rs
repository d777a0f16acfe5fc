pub mod clock;
pub mod driver;
pub mod record;
pub mod session;
pub mod timer;

pub use clock::{format_time, ClockManager};
pub use driver::{spawn_session, SessionHandle};
pub use record::{save_record, GameRecord};
pub use session::{MoveRejection, Session, SessionSnapshot, SessionState, UnlockGate};
