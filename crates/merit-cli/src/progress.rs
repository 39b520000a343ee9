use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the gate groups of a batch run.
///
/// Disabled (hidden) when per-layout progress lines are requested, so the bar
/// never interleaves with the engine's console output.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    pub fn new(total_groups: u64, enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new(total_groups).with_style(Self::bar_style());
            bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn start_group(&self, gate_name: &str) {
        self.bar.set_message(gate_name.to_string());
    }

    pub fn finish_group(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("Failed to create bar style template")
            .progress_chars("##-")
    }
}
