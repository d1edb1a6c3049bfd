use decoy_sentinel::{Granularity, KeyFile, SentinelGenerator, SentinelTable, Window};

fn main() {
    let keys: KeyFile = "0 testkey1\n1 testkey2\n".parse().unwrap();
    let generator = SentinelGenerator::default();
    let window = Window::now(Granularity::Hour);
    let table = SentinelTable::for_windows(&generator, &keys, 16, &window.skew_tolerant()).unwrap();

    afl::fuzz!(|data: &[u8]| {
        if let Some(m) = table.find(data) {
            assert!(m.offset + table.pattern_len() <= data.len());
        }
        let _ = table.matches_prefix(data);
    });
}
