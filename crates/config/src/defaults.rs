pub fn default_enabled() -> bool {
    true
}

pub fn default_ticker() -> String {
    "BTC_USD".to_string()
}

pub fn default_interval_seconds() -> u64 {
    60
}

pub fn default_relevance_window_seconds() -> u64 {
    60
}

pub fn default_method() -> String {
    "mean".to_string()
}

pub fn default_tick_ms() -> u64 {
    1000
}

pub fn default_channel_capacity() -> usize {
    120
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
