use indicatif::{ProgressBar, ProgressBarIter, ProgressIterator, ProgressStyle};

/// Fixed-width bar matching the rest of the console output.
const PROGRESS_TEMPLATE: &str = "{prefix} [{bar:60}] {pos}/{len}";

/// Builds the standard progress bar used by all batch loops.
pub(crate) fn bar(len: u64, prefix: &str) -> ProgressBar {
    let progress_style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#.");

    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(progress_style);
    progress_bar.set_prefix(prefix.to_string());
    progress_bar.tick();
    progress_bar
}

/// Wraps an iterator so that each consumed element advances the bar. Elements
/// pass through unchanged; consuming the wrapper again restarts from zero.
pub(crate) fn wrap<I>(iter: I, len: u64, prefix: &str) -> ProgressBarIter<I>
where
    I: Iterator,
{
    iter.progress_with(bar(len, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_reemits_elements_unchanged() {
        let input = vec!["a", "b", "c"];
        let output: Vec<&str> = wrap(input.clone().into_iter(), 3, "Testing").collect();
        assert_eq!(output, input);
    }

    #[test]
    fn wrap_tolerates_empty_input() {
        let output: Vec<u32> = wrap(Vec::new().into_iter(), 0, "Testing").collect();
        assert!(output.is_empty());
    }
}
