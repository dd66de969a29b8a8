//! Debug overlay: live party/variable/switch state formatted into drawable
//! lines. Pure read-and-format — the host owns the toggle key binding and
//! renders the lines into whatever window chrome it has.

use crate::config::OverlayConfig;
use crate::host::{DataNames, PartyStatus, SwitchStore, VariableStore};

// ── Lines ────────────────────────────────────────────────────────────────────

/// Color class of a formatted line; the host maps these to its palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Section,
    Entry,
    SwitchOn,
    SwitchOff,
}

/// One left-label / right-value row. Section and header rows leave `value`
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLine {
    pub label: String,
    pub value: String,
    pub kind: LineKind,
}

impl OverlayLine {
    fn header(label: &str) -> Self {
        Self { label: label.to_string(), value: String::new(), kind: LineKind::Header }
    }

    fn section(label: &str) -> Self {
        Self { label: label.to_string(), value: String::new(), kind: LineKind::Section }
    }

    fn entry(label: String, value: String) -> Self {
        Self { label, value, kind: LineKind::Entry }
    }
}

// ── Overlay ──────────────────────────────────────────────────────────────────

/// The debug-viewer window state. Hidden by default; the host flips it from
/// its key handler and rebuilds the lines each frame while visible.
pub struct DebugOverlay {
    config: OverlayConfig,
    visible: bool,
}

impl DebugOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config, visible: false }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Format the current game state into rows. Sections honor the config
    /// toggles; ids without an editor name render `(no name)`.
    pub fn build_lines(
        &self,
        party: &dyn PartyStatus,
        switches: &dyn SwitchStore,
        variables: &dyn VariableStore,
        names: &dyn DataNames,
    ) -> Vec<OverlayLine> {
        let mut lines = vec![OverlayLine::header("Debug Viewer")];
        lines.push(OverlayLine::entry("Gold:".to_string(), party.gold().to_string()));

        if self.config.show_party {
            lines.push(OverlayLine::section("- Party -"));
            let members = party.members();
            if members.is_empty() {
                lines.push(OverlayLine::entry("Party:".to_string(), "(none)".to_string()));
            }
            for member in members {
                lines.push(OverlayLine::entry(
                    format!("{}:", member.name),
                    format!("HP {}/{}  MP {}/{}", member.hp, member.max_hp, member.mp, member.max_mp),
                ));
            }
        }

        if self.config.show_variables {
            lines.push(OverlayLine::section("- Variables -"));
            for id in self.config.variable_id_list() {
                let name = names.variable_name(id).unwrap_or_else(|| "(no name)".to_string());
                lines.push(OverlayLine::entry(format!("#{id} {name}"), variables.value(id).to_string()));
            }
        }

        if self.config.show_switches {
            lines.push(OverlayLine::section("- Switches -"));
            for id in self.config.switch_id_list() {
                let name = names.switch_name(id).unwrap_or_else(|| "(no name)".to_string());
                let on = switches.value(id);
                lines.push(OverlayLine {
                    label: format!("#{id} {name}"),
                    value: if on { "ON" } else { "OFF" }.to_string(),
                    kind: if on { LineKind::SwitchOn } else { LineKind::SwitchOff },
                });
            }
        }

        lines
    }
}
