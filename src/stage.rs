//! Portrait stage: up to three named portrait slots driven by message-stream
//! directives, advanced once per display frame by the host.

use std::rc::Rc;

use glam::Vec2;

use crate::config::StageConfig;
use crate::escape::MessageCommand;
use crate::host::{ImageAsset, PictureLoader};
use crate::layout;

// ── Slots ────────────────────────────────────────────────────────────────────

/// One of the three fixed portrait positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Left,
    Center,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Left, Slot::Center, Slot::Right];

    /// Parse a single-slot token (`L`/`C`/`R`, case-insensitive).
    pub fn parse(token: &str) -> Option<Slot> {
        match token.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Slot::Left),
            "C" => Some(Slot::Center),
            "R" => Some(Slot::Right),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Slot::Left => 'L',
            Slot::Center => 'C',
            Slot::Right => 'R',
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A slot argument as written in message text: a single slot or `ALL`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotSelector {
    One(Slot),
    All,
}

impl SlotSelector {
    pub fn parse(token: &str) -> Option<SlotSelector> {
        if token.trim().eq_ignore_ascii_case("ALL") {
            return Some(SlotSelector::All);
        }
        Slot::parse(token).map(SlotSelector::One)
    }
}

// ── Frame context ────────────────────────────────────────────────────────────

/// Per-frame layout inputs, sampled from the host right before `tick`.
///
/// `msg_top` is the message box's current top edge (screen height when no
/// message box exists). Sampling it every frame is what keeps portraits
/// glued to a moving message box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameContext {
    pub msg_top: f32,
    pub screen_width: f32,
}

// ── Sprite state ─────────────────────────────────────────────────────────────

/// Drawable state for one visible portrait. The host reads these after each
/// tick and renders them however it likes; this crate never draws.
pub struct PortraitSprite {
    pub asset: Rc<dyn ImageAsset>,
    /// Anchor position: horizontal center, vertical bottom.
    pub pos: Vec2,
    pub scale: f32,
    /// Current alpha, 0–255.
    pub opacity: u8,
    /// Current dim level, 0.0–1.0. Stays 1.0 unless dim mode is active.
    pub brightness: f32,
}

/// In-flight opacity interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fade {
    from: i32,
    to: i32,
    duration: u32,
    elapsed: u32,
    remove_on_complete: bool,
}

impl Fade {
    /// Advance one frame and return the interpolated opacity plus whether
    /// the fade just completed. Linear, rounded, clamped at the target.
    fn step(&mut self) -> (u8, bool) {
        self.elapsed += 1;
        let t = self.elapsed.min(self.duration);
        let value =
            self.from as f32 + (self.to - self.from) as f32 * t as f32 / self.duration as f32;
        let opacity = (value.round() as i32).clamp(0, 255) as u8;
        (opacity, self.elapsed >= self.duration)
    }
}

struct PendingLoad {
    asset: Rc<dyn ImageAsset>,
    /// Slot generation captured when the load was issued. A completion whose
    /// generation no longer matches the slot's is stale and gets discarded.
    generation: u64,
}

#[derive(Default)]
struct SlotState {
    pending: Option<PendingLoad>,
    sprite: Option<PortraitSprite>,
    fade: Option<Fade>,
    generation: u64,
}

// ── Stage ────────────────────────────────────────────────────────────────────

/// Owner of the three portrait slots and the speaker reference.
///
/// Construct one per active session and drive it from the host's frame loop:
/// apply parsed message commands as they stream out, then call `tick` once
/// per display frame. All failure paths are silent no-ops.
pub struct PortraitStage {
    config: StageConfig,
    slots: [SlotState; 3],
    speaker: Option<Slot>,
}

impl PortraitStage {
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            slots: std::array::from_fn(|_| SlotState::default()),
            speaker: None,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn speaker(&self) -> Option<Slot> {
        self.speaker
    }

    /// The slot's drawable sprite, if one is attached (visible or fading out).
    pub fn sprite(&self, slot: Slot) -> Option<&PortraitSprite> {
        self.slots[slot.index()].sprite.as_ref()
    }

    /// True while a show request's asset is still loading.
    pub fn is_loading(&self, slot: Slot) -> bool {
        let st = &self.slots[slot.index()];
        st.pending.as_ref().is_some_and(|p| p.generation == st.generation)
    }

    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.slots[slot.index()].sprite.is_some()
    }

    /// Occupied slots in draw order, left to right.
    pub fn sprites(&self) -> impl Iterator<Item = (Slot, &PortraitSprite)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.slots[slot.index()].sprite.as_ref().map(|sp| (slot, sp)))
    }

    // ── Command surface ────────────────────────────────────────────────────

    /// Route one parsed message command to the matching operation.
    pub fn apply(&mut self, loader: &mut dyn PictureLoader, command: &MessageCommand) {
        match command {
            MessageCommand::Show { asset, slot } => self.show(loader, asset, *slot),
            MessageCommand::Hide { slots } => {
                for slot in slots {
                    self.hide(*slot);
                }
            }
            MessageCommand::Focus { slot } => self.focus(*slot),
            MessageCommand::Noop => {}
        }
    }

    /// Begin showing `name` in `slot`. An occupied slot is torn down
    /// immediately (no cross-fade); the new picture attaches once its load
    /// completes, fading in from zero opacity.
    pub fn show(&mut self, loader: &mut dyn PictureLoader, name: &str, slot: Slot) {
        self.remove_slot(slot);
        let st = &mut self.slots[slot.index()];
        st.generation = st.generation.wrapping_add(1);
        st.pending = Some(PendingLoad {
            asset: loader.load_picture(name),
            generation: st.generation,
        });
    }

    /// Fade the slot out and remove its image on completion. Retriggering a
    /// fade-out restarts it from the current opacity. An empty slot is a
    /// no-op; a still-loading slot has its load superseded instead.
    pub fn hide(&mut self, slot: Slot) {
        let fade_out = self.config.fade_out();
        let st = &mut self.slots[slot.index()];
        let had_target = st.sprite.is_some() || st.pending.is_some();

        if st.pending.is_some() {
            // The load itself cannot be cancelled; bumping the generation
            // makes its eventual completion compare stale.
            st.generation = st.generation.wrapping_add(1);
        }
        if let Some(sprite) = &st.sprite {
            st.fade = Some(Fade {
                from: sprite.opacity as i32,
                to: 0,
                duration: fade_out,
                elapsed: 0,
                remove_on_complete: true,
            });
        }
        // Speaker clears right away, not at fade completion.
        if had_target && self.speaker == Some(slot) {
            self.speaker = None;
        }
    }

    /// Set or clear the speaker. No occupancy check: focusing an empty slot
    /// has no visible effect until the slot fills.
    pub fn focus(&mut self, slot: Option<Slot>) {
        self.speaker = slot;
    }

    // ── Per-frame advancement ──────────────────────────────────────────────

    /// Advance the stage by one display frame: attach finished loads, step
    /// fades and dim, then relayout every ready sprite against the current
    /// frame context.
    pub fn tick(&mut self, frame: &FrameContext) {
        self.attach_ready(frame);
        self.step_fades();
        self.step_dim();
        self.relayout(frame);
    }

    fn attach_ready(&mut self, frame: &FrameContext) {
        let config = self.config;
        for slot in Slot::ALL {
            let st = &mut self.slots[slot.index()];
            let Some(pending) = &st.pending else { continue };

            if pending.generation != st.generation {
                // Superseded while loading; the completion must not attach.
                log::debug!("portrait: stale load for slot {} dropped", slot.letter());
                st.pending = None;
                continue;
            }
            if !pending.asset.is_ready() {
                continue;
            }

            let asset = Rc::clone(&pending.asset);
            st.pending = None;

            // Layout uses the frame context sampled *now*, not at request
            // time, so a message box that moved during the load is honored.
            let region = layout::portrait_region(slot, frame.msg_top, &config, frame.screen_width);
            let scale = layout::contain_scale(
                asset.width() as f32,
                asset.height() as f32,
                region.width,
                region.height,
            );
            st.sprite = Some(PortraitSprite {
                asset,
                pos: region.anchor(),
                scale,
                opacity: 0,
                brightness: 1.0,
            });
            st.fade = Some(Fade {
                from: 0,
                to: 255,
                duration: config.fade_in(),
                elapsed: 0,
                remove_on_complete: false,
            });
            if config.dim_enabled {
                self.speaker = Some(slot);
            }
        }
    }

    fn step_fades(&mut self) {
        for slot in Slot::ALL {
            let st = &mut self.slots[slot.index()];
            let Some(fade) = &mut st.fade else { continue };

            let (opacity, done) = fade.step();
            if let Some(sprite) = &mut st.sprite {
                sprite.opacity = opacity;
            }
            if done {
                let remove = fade.remove_on_complete;
                st.fade = None;
                if remove {
                    st.sprite = None;
                    if self.speaker == Some(slot) {
                        self.speaker = None;
                    }
                }
            }
        }
    }

    fn step_dim(&mut self) {
        if !self.config.dim_enabled {
            return;
        }

        // Soft default: with no speaker set and exactly one occupied slot,
        // that slot becomes the speaker.
        if self.speaker.is_none() {
            let mut occupied = Slot::ALL.into_iter().filter(|s| self.is_occupied(*s));
            if let (Some(only), None) = (occupied.next(), occupied.next()) {
                self.speaker = Some(only);
            }
        }

        let dim_level = self.config.dim_brightness.clamp(0.0, 1.0);
        let step = self.config.dim_fade_frames.max(1) as f32;
        for slot in Slot::ALL {
            let target = match self.speaker {
                Some(speaker) if speaker != slot => dim_level,
                _ => 1.0,
            };
            if let Some(sprite) = &mut self.slots[slot.index()].sprite {
                sprite.brightness += (target - sprite.brightness) / step;
            }
        }
    }

    fn relayout(&mut self, frame: &FrameContext) {
        let config = self.config;
        for slot in Slot::ALL {
            let Some(sprite) = &mut self.slots[slot.index()].sprite else { continue };
            if !sprite.asset.is_ready() {
                continue;
            }
            let region = layout::portrait_region(slot, frame.msg_top, &config, frame.screen_width);
            sprite.scale = layout::contain_scale(
                sprite.asset.width() as f32,
                sprite.asset.height() as f32,
                region.width,
                region.height,
            );
            sprite.pos = region.anchor();
        }
    }

    /// Tear a slot down synchronously: image, fade record, and — when the
    /// slot was the speaker — the speaker reference.
    fn remove_slot(&mut self, slot: Slot) {
        let st = &mut self.slots[slot.index()];
        st.fade = None;
        st.sprite = None;
        if self.speaker == Some(slot) {
            self.speaker = None;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
