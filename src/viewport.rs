use tokio::sync::watch;
use tracing::debug;

/// UI density class derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
  /// Narrow viewport: the sidebar overlays the player and is hidden unless opened.
  Compact,
  /// Wide viewport: sidebar and player side by side.
  Full,
}

impl LayoutMode {
  /// Widths strictly below `breakpoint` are compact.
  pub fn classify(width: u32, breakpoint: u32) -> Self {
    if width < breakpoint { LayoutMode::Compact } else { LayoutMode::Full }
  }

  pub fn label(self) -> &'static str {
    match self {
      LayoutMode::Compact => "compact",
      LayoutMode::Full => "full",
    }
  }
}

/// A resize that crossed the breakpoint. Carries the sidebar visibility it imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChange {
  EnteredCompact,
  EnteredFull,
}

impl LayoutChange {
  pub fn mode(self) -> LayoutMode {
    match self {
      LayoutChange::EnteredCompact => LayoutMode::Compact,
      LayoutChange::EnteredFull => LayoutMode::Full,
    }
  }

  pub fn sidebar_visible(self) -> bool {
    self == LayoutChange::EnteredFull
  }
}

/// Tracks the live viewport width and classifies it against a single breakpoint.
///
/// Width updates arrive through a `watch` channel; dropping the classifier (or calling
/// [`unsubscribe`](Self::unsubscribe)) releases the receiver, which the sending side observes as
/// a closed channel. Only the latest width is seen when several resizes land between two polls.
#[derive(Debug)]
pub struct ViewportClassifier {
  breakpoint: u32,
  width: u32,
  mode: LayoutMode,
  resizes: Option<watch::Receiver<u32>>,
}

impl ViewportClassifier {
  pub fn new(width: u32, breakpoint: u32) -> Self {
    Self { breakpoint, width, mode: LayoutMode::classify(width, breakpoint), resizes: None }
  }

  /// Follow a width feed. The feed's current value is applied right away.
  pub fn subscribe(&mut self, mut resizes: watch::Receiver<u32>) -> Option<LayoutChange> {
    let width = *resizes.borrow_and_update();
    self.resizes = Some(resizes);
    self.resize(width)
  }

  pub fn unsubscribe(&mut self) {
    self.resizes = None;
  }

  pub fn is_subscribed(&self) -> bool {
    self.resizes.is_some()
  }

  pub fn mode(&self) -> LayoutMode {
    self.mode
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn breakpoint(&self) -> u32 {
    self.breakpoint
  }

  /// Record a new width. Returns a change only when the breakpoint was crossed.
  pub fn resize(&mut self, width: u32) -> Option<LayoutChange> {
    self.width = width;
    let mode = LayoutMode::classify(width, self.breakpoint);
    if mode == self.mode {
      return None;
    }
    debug!(width, from = self.mode.label(), to = mode.label(), "viewport: crossed breakpoint");
    self.mode = mode;
    Some(match mode {
      LayoutMode::Compact => LayoutChange::EnteredCompact,
      LayoutMode::Full => LayoutChange::EnteredFull,
    })
  }

  /// Apply the latest width from the feed, if it moved since the last poll.
  pub fn poll(&mut self) -> Option<LayoutChange> {
    let rx = self.resizes.as_mut()?;
    match rx.has_changed() {
      Ok(true) => {
        let width = *rx.borrow_and_update();
        self.resize(width)
      }
      Ok(false) => None,
      Err(_) => {
        debug!("viewport: resize feed closed");
        self.resizes = None;
        None
      }
    }
  }
}
