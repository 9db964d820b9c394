use indicatif::{ProgressBar, ProgressStyle};

use crate::error::SolverError;

pub fn progress_bar(len: u64) -> Result<ProgressBar, SolverError> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} (eta: {eta}) {msg}",
            )?
            .progress_chars("█░"),
    );
    Ok(pb)
}
