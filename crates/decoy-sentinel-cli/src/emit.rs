use std::io::{BufWriter, Write};

use anyhow::Result;
use decoy_sentinel::Sentinels;
use indicatif::ProgressBar;

use crate::{config::OutputSettings, get_progress_style};

/// Write one `sequence search-pattern label` line per sentinel, in stream
/// order. Returns the number of lines written.
pub fn write_sentinels<W: Write>(
    mut sentinels: Sentinels,
    out: W,
    settings: &OutputSettings,
) -> Result<usize> {
    let bar = if settings.progress {
        let bar = ProgressBar::new(sentinels.len() as u64);
        bar.set_style(get_progress_style()?);
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut writer = BufWriter::new(out);
    let mut written = 0;

    if settings.parallel {
        loop {
            let chunk = sentinels.next_chunk_par(settings.chunk_size);
            if chunk.is_empty() {
                break;
            }
            for record in &chunk {
                writeln!(writer, "{record}")?;
            }
            written += chunk.len();
            bar.inc(chunk.len() as u64);
        }
    } else {
        for record in sentinels {
            writeln!(writer, "{record}")?;
            written += 1;
            if written % 4096 == 0 {
                bar.inc(4096);
            }
        }
    }

    writer.flush()?;
    bar.finish_and_clear();
    Ok(written)
}
