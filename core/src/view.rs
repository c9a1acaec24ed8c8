use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Initializing,
    Ready,
    Error,
    Idle,
}

/// Fill is White's share of the bar. Only the side ahead carries a label.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalBar {
    pub fill: f64,
    pub white_label: String,
    pub black_label: String,
}

/// Display surface driven by the presenter.
pub trait View {
    fn indicator(&mut self, indicator: Indicator, text: &str);
    fn engine_name(&mut self, name: &str);
    fn depth(&mut self, text: &str, fraction: f64);
    fn speed(&mut self, text: &str);
    fn evaluation(&mut self, text: &str);
    fn eval_bar(&mut self, bar: &EvalBar);
    fn wdl(&mut self, text: &str);
    /// Principal variation or best move text
    fn line(&mut self, text: &str);
    fn line_visible(&mut self, visible: bool);
    fn highlight(&mut self, from: &str, to: &str);
}

/// Prints every display update to stdout.
#[derive(Debug, Default)]
pub struct TerminalView {
    line_visible: bool,
}

impl View for TerminalView {
    fn indicator(&mut self, indicator: Indicator, text: &str) {
        info!("Indicator {:?}: {}", indicator, text);
        println!("[{:?}] {}", indicator, text);
    }

    fn engine_name(&mut self, name: &str) {
        println!("Engine: {}", name);
    }

    fn depth(&mut self, text: &str, fraction: f64) {
        println!("Depth: {} ({:.0}%)", text, fraction * 100.0);
    }

    fn speed(&mut self, text: &str) {
        println!("Speed: {}", text);
    }

    fn evaluation(&mut self, text: &str) {
        println!("Eval: {}", text);
    }

    fn eval_bar(&mut self, bar: &EvalBar) {
        const WIDTH: usize = 40;
        let white = (bar.fill * WIDTH as f64).round() as usize;
        println!(
            "{:>9} [{}{}] {}",
            bar.white_label,
            "#".repeat(white.min(WIDTH)),
            ".".repeat(WIDTH - white.min(WIDTH)),
            bar.black_label
        );
    }

    fn wdl(&mut self, text: &str) {
        println!("WDL: {}", text);
    }

    fn line(&mut self, text: &str) {
        if self.line_visible {
            println!("{}", text);
        }
    }

    fn line_visible(&mut self, visible: bool) {
        self.line_visible = visible;
    }

    fn highlight(&mut self, from: &str, to: &str) {
        println!("Highlight: {} -> {}", from, to);
    }
}
