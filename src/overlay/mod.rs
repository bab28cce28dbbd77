//! Per-video overlay widget: a speed label flanked by step arrows.
use std::time::Duration;

use crate::page::{Document, OverlayId, VideoId};
use crate::speed::{SpeedOp, format_speed};

pub const DEFAULT_FADE_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_DIMMED_OPACITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    /// How long after the pointer leaves before an inactive overlay dims.
    pub fade_delay: Duration,
    pub dimmed_opacity: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            fade_delay: DEFAULT_FADE_DELAY,
            dimmed_opacity: DEFAULT_DIMMED_OPACITY,
        }
    }
}

/// Clickable region of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayZone {
    Decrease,
    /// The speed label; clicking it resets.
    Display,
    Increase,
}

impl OverlayZone {
    #[must_use]
    pub const fn op(self) -> SpeedOp {
        match self {
            OverlayZone::Decrease => SpeedOp::Decrease,
            OverlayZone::Display => SpeedOp::Reset,
            OverlayZone::Increase => SpeedOp::Increase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opacity {
    Opaque,
    Dimmed,
}

/// Everything the host needs to paint the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub label: String,
    pub opacity: f64,
    pub visible: bool,
}

#[derive(Debug)]
pub struct OverlayControl {
    mount: Option<OverlayId>,
    label: String,
    opacity: Opacity,
    visible: bool,
    dimmed_opacity: f64,
}

impl OverlayControl {
    #[must_use]
    pub fn new(rate: f64, visible: bool, opacity: Opacity, settings: &OverlaySettings) -> Self {
        Self {
            mount: None,
            label: format_speed(rate),
            opacity,
            visible,
            dimmed_opacity: settings.dimmed_opacity,
        }
    }

    #[must_use]
    pub fn view(&self) -> OverlayView {
        OverlayView {
            label: self.label.clone(),
            opacity: match self.opacity {
                Opacity::Opaque => 1.0,
                Opacity::Dimmed => self.dimmed_opacity,
            },
            visible: self.visible,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn opacity(&self) -> Opacity {
        self.opacity
    }

    #[must_use]
    pub const fn mount(&self) -> Option<OverlayId> {
        self.mount
    }

    pub fn attach<D>(&mut self, document: &D, video: VideoId)
    where
        D: Document + ?Sized,
    {
        self.mount = document.mount_overlay(video, &self.view());
    }

    pub fn show_rate<D>(&mut self, document: &D, rate: f64)
    where
        D: Document + ?Sized,
    {
        let label = format_speed(rate);
        if label != self.label {
            self.label = label;
            self.render(document);
        }
    }

    pub fn set_opacity<D>(&mut self, document: &D, opacity: Opacity)
    where
        D: Document + ?Sized,
    {
        if opacity != self.opacity {
            self.opacity = opacity;
            self.render(document);
        }
    }

    pub fn detach<D>(self, document: &D)
    where
        D: Document + ?Sized,
    {
        if let Some(mount) = self.mount {
            document.unmount_overlay(mount);
        }
    }

    fn render<D>(&self, document: &D)
    where
        D: Document + ?Sized,
    {
        if let Some(mount) = self.mount {
            document.render_overlay(mount, &self.view());
        }
    }
}
