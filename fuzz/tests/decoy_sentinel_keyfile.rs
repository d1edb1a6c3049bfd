// #[cfg(feature = "fuzz-tests")]
#[cfg(test)]
mod tests {
    use decoy_sentinel::{Error, KeyFile};

    #[test]
    fn test_keyfile_artifacts() {
        let artifacts: [&[u8]; 8] = [
            b"\n",
            b"\r\n",
            b"0",
            b"0 \t",
            b"\xff\xfe k",
            b"0 k\n\x0b\x0c\n",
            b"0 k\r\r\n1 j",
            "0 \u{2003}k\u{85}1".as_bytes(),
        ];

        for data in artifacts {
            println!("{:?}", String::from_utf8_lossy(data));

            match KeyFile::from_bytes(data) {
                Ok(keys) => {
                    for entry in keys.entries() {
                        assert!(!entry.index.is_empty());
                        assert!(!entry.key.is_empty());
                    }
                }
                Err(Error::Parse { line, .. }) => assert!(line >= 1),
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }
}
