use decoy_sentinel::{Granularity, KeyFile, SentinelGenerator, Window};

fn main() {
    afl::fuzz!(|data: &[u8]| {
        let Ok(keys) = KeyFile::from_bytes(data) else {
            return;
        };
        let generator = SentinelGenerator::default();
        let window = Window::now(Granularity::Hour);
        let Ok(sentinels) = generator.sentinels(&keys, 2, window) else {
            return;
        };
        for record in sentinels {
            assert_eq!(record.search_pattern.len() + record.label.len(), 64);
        }
    });
}
