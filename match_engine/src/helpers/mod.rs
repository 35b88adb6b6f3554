mod clock;
mod local_day;
mod pair_lock;

pub use clock::{Clock, SystemClock};
pub use local_day::{next_local_midnight, start_of_local_day};
pub use pair_lock::{PairGuard, PairLocks};
