/// Tests for the debug-overlay line formatter.
use std::collections::HashMap;

use msgstage::config::OverlayConfig;
use msgstage::host::{DataNames, MemberStatus, PartyStatus, SwitchStore, VariableStore};
use msgstage::overlay::{DebugOverlay, LineKind, OverlayLine};

// ── Fake world ───────────────────────────────────────────────────────────────

struct World {
    gold: i64,
    members: Vec<MemberStatus>,
    switches: HashMap<u32, bool>,
    variables: HashMap<u32, i64>,
    switch_names: HashMap<u32, String>,
    variable_names: HashMap<u32, String>,
}

impl World {
    fn empty() -> Self {
        Self {
            gold: 0,
            members: Vec::new(),
            switches: HashMap::new(),
            variables: HashMap::new(),
            switch_names: HashMap::new(),
            variable_names: HashMap::new(),
        }
    }

    fn sample() -> Self {
        let mut world = Self::empty();
        world.gold = 1280;
        world.members.push(MemberStatus {
            name: "Arin".to_string(),
            hp: 412,
            max_hp: 520,
            mp: 88,
            max_mp: 120,
        });
        world.switches.insert(1, true);
        world.switch_names.insert(1, "MetPriest".to_string());
        world.variables.insert(2, 7);
        world.variable_names.insert(2, "QuestStep".to_string());
        world
    }
}

impl PartyStatus for World {
    fn gold(&self) -> i64 {
        self.gold
    }

    fn members(&self) -> Vec<MemberStatus> {
        self.members.clone()
    }
}

impl SwitchStore for World {
    fn value(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }
}

impl VariableStore for World {
    fn value(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }
}

impl DataNames for World {
    fn switch_name(&self, id: u32) -> Option<String> {
        self.switch_names.get(&id).cloned()
    }

    fn variable_name(&self, id: u32) -> Option<String> {
        self.variable_names.get(&id).cloned()
    }
}

fn lines_for(config: OverlayConfig, world: &World) -> Vec<OverlayLine> {
    DebugOverlay::new(config).build_lines(world, world, world, world)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn overlay_starts_hidden_and_toggles() {
    let mut overlay = DebugOverlay::new(OverlayConfig::default());
    assert!(!overlay.is_visible());
    assert!(overlay.toggle());
    assert!(overlay.is_visible());
    assert!(!overlay.toggle());
}

#[test]
fn header_and_gold_are_always_present() {
    let config = OverlayConfig {
        show_party: false,
        show_variables: false,
        show_switches: false,
        ..OverlayConfig::default()
    };
    let lines = lines_for(config, &World::sample());
    assert_eq!(lines.len(), 2, "only header and gold remain with all sections off");
    assert_eq!(lines[0].kind, LineKind::Header);
    assert_eq!(lines[1].label, "Gold:");
    assert_eq!(lines[1].value, "1280");
}

#[test]
fn party_section_lists_members_with_vitals() {
    let config = OverlayConfig {
        show_variables: false,
        show_switches: false,
        ..OverlayConfig::default()
    };
    let lines = lines_for(config, &World::sample());
    assert_eq!(lines[2].label, "- Party -");
    assert_eq!(lines[2].kind, LineKind::Section);
    assert_eq!(lines[3].label, "Arin:");
    assert_eq!(lines[3].value, "HP 412/520  MP 88/120");
}

#[test]
fn empty_party_renders_a_placeholder_row() {
    let config = OverlayConfig {
        show_variables: false,
        show_switches: false,
        ..OverlayConfig::default()
    };
    let lines = lines_for(config, &World::empty());
    assert_eq!(lines[3].label, "Party:");
    assert_eq!(lines[3].value, "(none)");
}

#[test]
fn switch_rows_carry_their_state_as_kind() {
    let config = OverlayConfig {
        show_party: false,
        show_variables: false,
        switch_ids: "1,2".to_string(),
        ..OverlayConfig::default()
    };
    let lines = lines_for(config, &World::sample());
    let on = &lines[3];
    let off = &lines[4];
    assert_eq!(on.label, "#1 MetPriest");
    assert_eq!(on.value, "ON");
    assert_eq!(on.kind, LineKind::SwitchOn);
    assert_eq!(off.label, "#2 (no name)", "unnamed ids get a placeholder");
    assert_eq!(off.value, "OFF");
    assert_eq!(off.kind, LineKind::SwitchOff);
}

#[test]
fn variable_rows_show_current_values() {
    let config = OverlayConfig {
        show_party: false,
        show_switches: false,
        variable_ids: "2,9".to_string(),
        ..OverlayConfig::default()
    };
    let lines = lines_for(config, &World::sample());
    assert_eq!(lines[3].label, "#2 QuestStep");
    assert_eq!(lines[3].value, "7");
    assert_eq!(lines[4].label, "#9 (no name)");
    assert_eq!(lines[4].value, "0", "unset variables read as zero");
}

#[test]
fn garbage_in_id_lists_is_dropped() {
    let config = OverlayConfig {
        show_party: false,
        show_variables: false,
        switch_ids: "0, x, 1".to_string(),
        ..OverlayConfig::default()
    };
    let lines = lines_for(config, &World::sample());
    // Header, gold, section, then exactly one switch row (id 1).
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3].label, "#1 MetPriest");
}
