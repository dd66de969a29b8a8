//! Headless demo host: streams a short scripted dialogue through the
//! portrait stage, then exercises the condition evaluator and debug overlay
//! against a tiny in-memory world.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use msgstage::config::{PluginConfig, StageConfig};
use msgstage::escape::parse_command;
use msgstage::eval::EvalResults;
use msgstage::host::{
    DataNames, ImageAsset, MemberStatus, PartyStatus, PictureLoader, SwitchStore, VariableStore,
};
use msgstage::overlay::{DebugOverlay, LineKind, OverlayLine};
use msgstage::stage::{FrameContext, PortraitStage};

// ── Demo asset loader ────────────────────────────────────────────────────────

/// In-memory picture with a fixed pretend load latency, so the loading state
/// is actually observable in the output.
struct DemoPicture {
    width: u32,
    height: u32,
    remaining: Cell<u32>,
}

impl ImageAsset for DemoPicture {
    fn is_ready(&self) -> bool {
        self.remaining.get() == 0
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

struct DemoLoader {
    catalog: HashMap<&'static str, (u32, u32)>,
    in_flight: Vec<Rc<DemoPicture>>,
    latency: u32,
}

impl DemoLoader {
    fn new(latency: u32) -> Self {
        let catalog = HashMap::from([
            ("Hero", (420, 800)),
            ("Priest", (380, 760)),
            ("Knight", (460, 820)),
        ]);
        Self { catalog, in_flight: Vec::new(), latency }
    }

    /// One frame of pretend I/O progress.
    fn tick(&mut self) {
        for picture in &self.in_flight {
            let left = picture.remaining.get();
            if left > 0 {
                picture.remaining.set(left - 1);
            }
        }
        self.in_flight.retain(|p| !p.is_ready());
    }
}

impl PictureLoader for DemoLoader {
    fn load_picture(&mut self, name: &str) -> Rc<dyn ImageAsset> {
        // Unknown names never become ready, like a missing file on disk.
        let (width, height) = self.catalog.get(name).copied().unwrap_or((0, 0));
        let remaining = if self.catalog.contains_key(name) { self.latency } else { u32::MAX };
        let picture = Rc::new(DemoPicture { width, height, remaining: Cell::new(remaining) });
        self.in_flight.push(Rc::clone(&picture));
        picture
    }
}

// ── Demo world ───────────────────────────────────────────────────────────────

struct DemoWorld {
    switches: HashMap<u32, bool>,
    variables: HashMap<u32, i64>,
}

impl SwitchStore for DemoWorld {
    fn value(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }
}

impl VariableStore for DemoWorld {
    fn value(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }
}

impl DataNames for DemoWorld {
    fn switch_name(&self, id: u32) -> Option<String> {
        (id == 1).then(|| "MetPriest".to_string())
    }

    fn variable_name(&self, id: u32) -> Option<String> {
        (id == 1).then(|| "QuestStep".to_string())
    }
}

impl PartyStatus for DemoWorld {
    fn gold(&self) -> i64 {
        1280
    }

    fn members(&self) -> Vec<MemberStatus> {
        vec![
            MemberStatus { name: "Arin".to_string(), hp: 412, max_hp: 520, mp: 88, max_mp: 120 },
            MemberStatus { name: "Sable".to_string(), hp: 305, max_hp: 305, mp: 40, max_mp: 64 },
        ]
    }
}

// ── Message scanning ─────────────────────────────────────────────────────────

/// Minimal stand-in for the host's message pipeline: recognize `\CODE[...]`
/// sequences, feed them to the stage, and return the remaining spoken text.
fn run_message(text: &str, stage: &mut PortraitStage, loader: &mut DemoLoader) -> String {
    let bytes = text.as_bytes();
    let mut spoken = String::new();
    let mut i = 0;
    while i < text.len() {
        let ch = text[i..].chars().next().unwrap();
        if ch == '\\' {
            let code_start = i + 1;
            let mut code_end = code_start;
            while code_end < text.len() && bytes[code_end].is_ascii_uppercase() {
                code_end += 1;
            }
            let code = &text[code_start..code_end];
            let mut cursor = code_end;
            if !code.is_empty() {
                if let Some(command) = parse_command(code, text, &mut cursor) {
                    stage.apply(loader, &command);
                    i = cursor;
                    continue;
                }
            }
        }
        spoken.push(ch);
        i += ch.len_utf8();
    }
    spoken
}

fn print_stage(stage: &PortraitStage) {
    for (slot, sprite) in stage.sprites() {
        println!(
            "  {} opacity {:3} brightness {:.2} scale {:.2} at ({:.0}, {:.0})",
            slot.letter(),
            sprite.opacity,
            sprite.brightness,
            sprite.scale,
            sprite.pos.x,
            sprite.pos.y,
        );
    }
    match stage.speaker() {
        Some(slot) => println!("  speaker: {}", slot.letter()),
        None => println!("  speaker: none"),
    }
}

fn print_line(line: &OverlayLine) {
    match line.kind {
        LineKind::Header | LineKind::Section => println!("  {}", line.label),
        _ => println!("  {:<24} {}", line.label, line.value),
    }
}

fn main() {
    env_logger::init();

    let config = PluginConfig::default();
    let stage_config = StageConfig {
        dim_enabled: true,
        fade_in_frames: 12,
        fade_out_frames: 12,
        ..config.stage
    };
    let mut stage = PortraitStage::new(stage_config);
    let mut loader = DemoLoader::new(3);
    let frame = FrameContext { msg_top: 444.0, screen_width: 816.0 };

    let script = [
        r"\SHOW[Hero,L]\SHOW[Priest,R]\FOCUS[L]Did you hear that?",
        r"\FOCUS[R]Every word. We should go.",
        r"\HIDE[ALL]Then it's settled.",
    ];

    for (page, text) in script.iter().enumerate() {
        let spoken = run_message(text, &mut stage, &mut loader);
        println!("page {}: {spoken}", page + 1);
        for _ in 0..30 {
            loader.tick();
            stage.tick(&frame);
        }
        print_stage(&stage);
    }

    let world = DemoWorld {
        switches: HashMap::from([(1, true)]),
        variables: HashMap::from([(1, 7)]),
    };
    let mut results = EvalResults::new();
    let met = results.run(Some("QuestStart"), "1", "1>=5", &world, &world);
    println!("QuestStart: {}", if met { "met" } else { "unmet" });

    let mut overlay = DebugOverlay::new(config.overlay);
    overlay.toggle();
    for line in overlay.build_lines(&world, &world, &world, &world) {
        print_line(&line);
    }
}
