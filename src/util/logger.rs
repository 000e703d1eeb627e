use std::fmt::{Debug, Display, Formatter};

use super::{Code, Log};

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<T> Log<T> {
    /// Total order of the log level, used to decide whether a given trace site fires.
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<TL: Display + Copy> Log<TL> {
    /// Trace a successful recognition at `at_order` or above. A no-op outside debug builds.
    pub fn trace_success<T: Debug>(&self, at: Log<()>, label: T, position: super::Position) {
        #[cfg(debug_assertions)]
        if self.order() >= at.order() {
            println!("[{}; success]: {:?} at {}", self, label, position);
        }
        #[cfg(not(debug_assertions))]
        let _ = (at, label, position);
    }

    /// Trace a failed recognition at `at_order` or above. A no-op outside debug builds.
    pub fn trace_failure(&self, at: Log<()>, index: usize, code: &Code) {
        #[cfg(debug_assertions)]
        if self.order() >= at.order() {
            println!("[{}; failure]: at {}", self, code.obtain_position(index));
        }
        #[cfg(not(debug_assertions))]
        let _ = (at, index, code);
    }
}
