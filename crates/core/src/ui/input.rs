//! Translation of egui input events into overlay pointer phases.
//!
//! egui synthesizes primary-button pointer events from touches, so only the
//! pointer stream is followed. Raw touch events are ignored: other fingers
//! report there too, and egui-winit follows a cancel of the tracked touch
//! with `PointerGone`. The pointer going away mid-press becomes
//! [`PointerPhase::Cancel`] at the last known position.

use crate::gesture::PointerPhase;
use eframe::egui;

/// One pointer event in overlay terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub pos: egui::Pos2,
}

/// Remembers what is needed to synthesize cancel events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    last_pos: Option<egui::Pos2>,
    pressed: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts one frame's worth of egui events, in order.
    pub fn translate(&mut self, events: &[egui::Event]) -> Vec<PointerInput> {
        let mut out = Vec::new();
        for event in events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    self.last_pos = Some(*pos);
                    self.pressed = *pressed;
                    let phase = if *pressed {
                        PointerPhase::Down
                    } else {
                        PointerPhase::Up
                    };
                    out.push(PointerInput { phase, pos: *pos });
                }
                egui::Event::PointerMoved(pos) => {
                    self.last_pos = Some(*pos);
                    if self.pressed {
                        out.push(PointerInput {
                            phase: PointerPhase::Move,
                            pos: *pos,
                        });
                    }
                }
                egui::Event::PointerGone => self.cancel(&mut out),
                _ => {}
            }
        }
        out
    }

    fn cancel(&mut self, out: &mut Vec<PointerInput>) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        if let Some(pos) = self.last_pos {
            out.push(PointerInput {
                phase: PointerPhase::Cancel,
                pos,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    fn phases(inputs: &[PointerInput]) -> Vec<PointerPhase> {
        inputs.iter().map(|i| i.phase).collect()
    }

    #[test]
    fn press_drag_release_maps_to_down_move_up() {
        let mut tracker = PointerTracker::new();
        let inputs = tracker.translate(&[
            egui::Event::PointerMoved(egui::pos2(1.0, 1.0)),
            button(10.0, 10.0, true),
            egui::Event::PointerMoved(egui::pos2(20.0, 15.0)),
            button(20.0, 15.0, false),
            egui::Event::PointerMoved(egui::pos2(30.0, 30.0)),
        ]);

        assert_eq!(
            phases(&inputs),
            vec![PointerPhase::Down, PointerPhase::Move, PointerPhase::Up]
        );
        assert_eq!(inputs[1].pos, egui::pos2(20.0, 15.0));
    }

    #[test]
    fn pointer_gone_while_pressed_cancels_at_last_position() {
        let mut tracker = PointerTracker::new();
        let inputs = tracker.translate(&[
            button(10.0, 10.0, true),
            egui::Event::PointerMoved(egui::pos2(40.0, 50.0)),
            egui::Event::PointerGone,
            egui::Event::PointerGone,
        ]);

        assert_eq!(
            inputs.last(),
            Some(&PointerInput {
                phase: PointerPhase::Cancel,
                pos: egui::pos2(40.0, 50.0)
            })
        );
        assert_eq!(inputs.len(), 3);
    }

    #[test]
    fn cancelled_second_finger_keeps_drag_alive() {
        let mut tracker = PointerTracker::new();
        let inputs = tracker.translate(&[
            button(10.0, 10.0, true),
            egui::Event::Touch {
                device_id: egui::TouchDeviceId(0),
                id: egui::TouchId(7),
                phase: egui::TouchPhase::Cancel,
                pos: egui::pos2(80.0, 80.0),
                force: None,
            },
            egui::Event::PointerMoved(egui::pos2(30.0, 20.0)),
        ]);

        assert_eq!(phases(&inputs), vec![PointerPhase::Down, PointerPhase::Move]);
        assert_eq!(inputs[1].pos, egui::pos2(30.0, 20.0));
    }

    #[test]
    fn secondary_button_is_ignored() {
        let mut tracker = PointerTracker::new();
        let inputs = tracker.translate(&[egui::Event::PointerButton {
            pos: egui::pos2(5.0, 5.0),
            button: egui::PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::default(),
        }]);
        assert!(inputs.is_empty());
    }
}
