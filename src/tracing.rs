use regex::Regex;
use std::io::Write;
use std::{env, thread};
use tokio::time::Instant;

const THREAD_ID_REGEX_STR: &str = "ThreadId\\(([[:digit:]]+)\\)";

/// Installs the `env_logger` backend.
///
/// Records whose target does not match `maybe_filter` (or `SOLARVIZ_TRACE_FILTER`
/// when no filter is given) are dropped. Only the first capture group of the
/// filter is printed as the target.
pub fn init(maybe_filter: Option<String>) {
    let launch_time = Instant::now();
    let target_regex_str = match maybe_filter {
        Some(filter) => filter,
        None => env::var("SOLARVIZ_TRACE_FILTER").unwrap_or_else(|_| "(.*)".to_string()),
    };
    let target_regex = match Regex::new(target_regex_str.as_str()) {
        Ok(regex) => regex,
        Err(_) => Regex::new("(.*)").expect("catch-all regex is valid"),
    };
    let thread_regex = Regex::new(THREAD_ID_REGEX_STR).expect("thread id regex is valid");

    let mut binding = env_logger::builder();
    let builder = binding.format(move |buf, record| {
        let target_str = record.target();
        let target = match target_regex
            .captures(target_str)
            .and_then(|captures| captures.get(1))
        {
            Some(target) => target.as_str().to_string(),
            None => return write!(buf, ""),
        };

        let thread_id_str = format!("{:?}", thread::current().id());
        let thread_id = thread_regex
            .captures(thread_id_str.as_str())
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default();

        let elapsed = launch_time.elapsed().as_millis() as f32 / 1000.;

        writeln!(buf, "{:<8}{:<4}{:<30}{}", elapsed.to_string(), thread_id, target, record.args())
    });
    // A second init (several test modules) is harmless.
    let _ = builder.try_init();
}
