use crate::input_data::{DATA_DIR_PARAM, PARAM_PREFIX};
use crate::InputData;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::collections::HashMap;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a request for `source` carrying the given user properties.
///
/// # Arguments
///
/// * `source` - Table name, stored as the data source.
/// * `props` - User properties without the `X-GP-` prefix, e.g. `("RANGE", "2008:2010")`.
pub fn input_data(source: &str, props: &[(&str, &str)]) -> InputData {
    let mut params = HashMap::new();
    params.insert(DATA_DIR_PARAM.to_string(), source.to_string());
    for (name, value) in props {
        params.insert(format!("{}{}", PARAM_PREFIX, name), value.to_string());
    }
    InputData::new(params).unwrap()
}

pub fn gen_rand_string(n: usize) -> String {
    thread_rng().sample_iter(Alphanumeric).take(n).map(char::from).collect()
}

/// Random `(start, end, interval)` for an int plan with `start <= end` and `interval >= 1`.
pub fn gen_int_range() -> (i32, i32, i32) {
    let mut rng = thread_rng();
    let start = rng.gen_range(-10_000..10_000);
    let end = start + rng.gen_range(0..5_000);
    let interval = rng.gen_range(1..700);
    (start, end, interval)
}

/// Random distinct enum values.
pub fn gen_enum_values(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{}", gen_rand_string(6), i)).collect()
}
