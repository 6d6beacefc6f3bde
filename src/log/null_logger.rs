/*!

A "logger" for builds without the `logging` feature. It writes nothing but keeps the log
level in sync so the `log` macros stay cheap.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
