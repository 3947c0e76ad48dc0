/*!
 * Call Handlers
 * One `impl SemihostingDispatcher` block per call family
 */

mod console;
mod file;
mod process;
mod query;
mod time;

pub use query::tmpnam_name;
