/// Powers of ten that privileged calls left in tracked chain parameters.
///
/// Exact matches only, neighbouring values are legitimate.
const DENYLIST: [i128; 10] = [
    10_000_000_000_000_000_000,
    1_000_000_000_000_000_000,
    100_000_000_000_000_000,
    10_000_000_000_000_000,
    1_000_000_000_000_000,
    100_000_000_000_000,
    10_000_000_000_000,
    1_000_000_000_000,
    100_000_000_000,
    10_000_000_000
];


pub fn is_anomalous(value: i128) -> bool {
    DENYLIST.contains(&value)
}
