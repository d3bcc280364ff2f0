// src/selection.rs
//
// Drag-to-select state machine. `transition` is pure: it consumes one event and returns the
// next state plus the repaint commands the overlay has to carry out.

use log::{debug, trace};

use crate::compositor::{self, Damage};
use crate::error::OverlayError;
use crate::framebuffer::FrameBuffer;
use crate::geometry::{Point, Rect};
use crate::overlay::Overlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The overlay needs a full redraw.
    Exposed,
    ButtonPressed { button: MouseButton, x: i32, y: i32 },
    ButtonReleased { button: MouseButton, x: i32, y: i32 },
    PointerMoved { x: i32, y: i32 },
    KeyPressed,
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BlitAll,
    Blit(Rect),
    DrawOutline(Rect),
    GrabInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Dragging,
    Finalized,
    Cancelled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finalized | Phase::Cancelled)
    }
}

/// Everything the controller tracks between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub phase: Phase,
    pub start: Point,
    pub current: Point,
    pub previous: Point,
    pub committed: Option<Rect>,
}

impl SelectionState {
    pub fn outline(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

pub fn transition(
    state: SelectionState,
    event: Event,
    bounds: Rect,
) -> (SelectionState, Vec<Command>) {
    use Phase::*;

    let mut next = state;
    let mut commands = Vec::new();

    match (state.phase, event) {
        (phase, _) if phase.is_terminal() => {}

        (_, Event::FocusLost) => commands.push(Command::GrabInput),

        (_, Event::KeyPressed) => next.phase = Cancelled,

        (
            _,
            Event::ButtonPressed {
                button: MouseButton::Secondary | MouseButton::Middle,
                ..
            },
        ) => next.phase = Cancelled,

        (Idle, Event::Exposed) => commands.push(Command::BlitAll),

        (Idle, Event::ButtonPressed { x, y, .. }) => {
            let p = Point::new(x, y).clamp_to_positive();
            next.start = p;
            next.current = p;
            next.previous = p;
            next.phase = Dragging;
        }

        (Dragging, Event::Exposed) => {
            commands.push(Command::BlitAll);
            commands.push(Command::DrawOutline(state.outline()));
        }

        (Dragging, Event::PointerMoved { x, y }) => {
            next.previous = state.current;
            next.current = Point::new(x, y).clamp_to_positive();

            match compositor::dirty_regions(next.start, next.previous, next.current, bounds) {
                Damage::Full => commands.push(Command::BlitAll),
                Damage::Partial(regions) => {
                    commands.extend(regions.into_iter().map(Command::Blit))
                }
            }
            commands.push(Command::DrawOutline(next.outline()));
        }

        (
            Dragging,
            Event::ButtonReleased {
                button: MouseButton::Primary,
                ..
            },
        ) => {
            next.committed = Some(state.outline());
            next.phase = Finalized;
        }

        _ => {}
    }

    (next, commands)
}

/// How a selection session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Selected(Rect),
    Cancelled,
}

pub struct SelectionController {
    state: SelectionState,
    bounds: Rect,
}

impl SelectionController {
    pub fn new(bounds: Rect) -> Self {
        SelectionController {
            state: SelectionState::default(),
            bounds,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        let (next, commands) = transition(self.state, event, self.bounds);
        if next.phase != self.state.phase {
            debug!("selection {:?} -> {:?} on {:?}", self.state.phase, next.phase, event);
        }
        self.state = next;
        commands
    }

    /// `None` while the session is still running.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.state.phase {
            Phase::Finalized => self.state.committed.map(Outcome::Selected),
            Phase::Cancelled => Some(Outcome::Cancelled),
            _ => None,
        }
    }
}

/// Runs the interactive selection on `overlay` until the user confirms or cancels.
///
/// Returns the selected region clipped to the framebuffer, or `None` when the user
/// cancelled, closed the overlay, or committed an empty rectangle.
pub fn select_region<O: Overlay>(
    overlay: &mut O,
    frame: &FrameBuffer,
) -> Result<Option<Rect>, OverlayError> {
    let bounds = frame.bounds();
    let mut controller = SelectionController::new(bounds);

    let outcome = loop {
        let Some(event) = overlay.next_event()? else {
            debug!("overlay closed before a selection was made");
            break Outcome::Cancelled;
        };

        let commands = controller.handle(event);
        if !commands.is_empty() {
            for command in &commands {
                trace!("{command:?}");
                match *command {
                    Command::BlitAll => overlay.blit(frame, bounds),
                    Command::Blit(region) => overlay.blit(frame, region),
                    Command::DrawOutline(rect) => overlay.draw_outline(rect),
                    Command::GrabInput => overlay.grab_input()?,
                }
            }
            overlay.present()?;
        }

        if let Some(outcome) = controller.outcome() {
            trace!("session ended in {:?}", controller.state());
            break outcome;
        }
    };

    match outcome {
        Outcome::Selected(rect) => {
            let region = rect.clip(&bounds);
            if region.is_degenerate() {
                debug!("empty selection {rect:?}, treating as cancelled");
                Ok(None)
            } else {
                debug!("selected {region:?}");
                Ok(Some(region))
            }
        }
        Outcome::Cancelled => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::tests::pattern;
    use std::collections::VecDeque;

    const BOUNDS: Rect = Rect::new(0, 0, 200, 200);

    fn press(x: i32, y: i32) -> Event {
        Event::ButtonPressed { button: MouseButton::Primary, x, y }
    }

    fn release(x: i32, y: i32) -> Event {
        Event::ButtonReleased { button: MouseButton::Primary, x, y }
    }

    fn moved(x: i32, y: i32) -> Event {
        Event::PointerMoved { x, y }
    }

    fn run(events: &[Event]) -> (SelectionController, Vec<Command>) {
        let mut controller = SelectionController::new(BOUNDS);
        let mut all = Vec::new();
        for &event in events {
            all.extend(controller.handle(event));
        }
        (controller, all)
    }

    #[test]
    fn drag_from_origin_is_clamped() {
        let (controller, _) = run(&[press(0, 0), moved(100, 50), release(100, 50)]);
        assert_eq!(controller.state().phase, Phase::Finalized);
        assert_eq!(
            controller.outcome(),
            Some(Outcome::Selected(Rect::new(1, 1, 99, 49)))
        );
    }

    #[test]
    fn click_without_motion_commits_degenerate_rect() {
        let (controller, _) = run(&[press(10, 10), moved(10, 10), release(10, 10)]);
        let Some(Outcome::Selected(rect)) = controller.outcome() else {
            panic!("expected a committed rectangle");
        };
        assert!(rect.is_degenerate());
    }

    #[test]
    fn key_press_cancels_in_idle_and_dragging() {
        let (idle, _) = run(&[Event::KeyPressed]);
        assert_eq!(idle.outcome(), Some(Outcome::Cancelled));

        let (dragging, _) = run(&[press(5, 5), moved(40, 40), Event::KeyPressed]);
        assert_eq!(dragging.outcome(), Some(Outcome::Cancelled));
        assert_eq!(dragging.state().committed, None);
    }

    #[test]
    fn non_primary_button_cancels() {
        let right = Event::ButtonPressed { button: MouseButton::Secondary, x: 3, y: 3 };
        let (controller, _) = run(&[right]);
        assert_eq!(controller.state().phase, Phase::Cancelled);

        let middle = Event::ButtonPressed { button: MouseButton::Middle, x: 3, y: 3 };
        let (controller, _) = run(&[press(5, 5), middle]);
        assert_eq!(controller.state().phase, Phase::Cancelled);
    }

    #[test]
    fn expose_redraws_capture_and_live_outline() {
        let (_, commands) = run(&[Event::Exposed]);
        assert_eq!(commands, vec![Command::BlitAll]);

        let (_, commands) = run(&[press(10, 10), moved(30, 20), Event::Exposed]);
        assert_eq!(
            &commands[commands.len() - 2..],
            &[Command::BlitAll, Command::DrawOutline(Rect::new(10, 10, 20, 10))]
        );
    }

    #[test]
    fn motion_repaints_sweeps_then_outline() {
        let (_, commands) = run(&[press(10, 10), moved(20, 20)]);
        assert!(matches!(commands.first(), Some(Command::Blit(_))));
        assert_eq!(
            commands.last(),
            Some(&Command::DrawOutline(Rect::new(10, 10, 10, 10)))
        );
        assert!(!commands.contains(&Command::BlitAll));
    }

    #[test]
    fn crossing_the_start_point_blits_everything() {
        let (_, commands) = run(&[press(50, 50), moved(60, 60), moved(40, 60)]);
        let tail = &commands[commands.len() - 2..];
        assert_eq!(
            tail,
            &[Command::BlitAll, Command::DrawOutline(Rect::new(40, 50, 10, 10))]
        );
    }

    #[test]
    fn focus_loss_regrabs_without_changing_phase() {
        let (controller, commands) = run(&[press(5, 5), Event::FocusLost]);
        assert_eq!(controller.state().phase, Phase::Dragging);
        assert_eq!(commands, vec![Command::GrabInput]);
    }

    #[test]
    fn terminal_states_ignore_input() {
        let (controller, commands) = run(&[Event::KeyPressed, Event::Exposed, press(4, 4)]);
        assert_eq!(controller.state().phase, Phase::Cancelled);
        assert!(commands.is_empty());
    }

    #[test]
    fn motion_and_release_in_idle_are_ignored() {
        let (controller, commands) = run(&[moved(10, 10), release(10, 10)]);
        assert_eq!(controller.state().phase, Phase::Idle);
        assert!(commands.is_empty());
    }

    #[derive(Default)]
    struct ScriptedOverlay {
        events: VecDeque<Event>,
        blits: Vec<Rect>,
        outlines: Vec<Rect>,
        grabs: usize,
        presents: usize,
    }

    impl ScriptedOverlay {
        fn with(events: &[Event]) -> Self {
            ScriptedOverlay {
                events: events.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl Overlay for ScriptedOverlay {
        fn blit(&mut self, _frame: &FrameBuffer, region: Rect) {
            self.blits.push(region);
        }

        fn draw_outline(&mut self, rect: Rect) {
            self.outlines.push(rect);
        }

        fn grab_input(&mut self) -> Result<(), OverlayError> {
            self.grabs += 1;
            Ok(())
        }

        fn present(&mut self) -> Result<(), OverlayError> {
            self.presents += 1;
            Ok(())
        }

        fn next_event(&mut self) -> Result<Option<Event>, OverlayError> {
            Ok(self.events.pop_front())
        }
    }

    #[test]
    fn session_returns_selected_region() {
        let frame = pattern(200, 100);
        let mut overlay = ScriptedOverlay::with(&[
            Event::Exposed,
            press(0, 0),
            moved(50, 20),
            moved(100, 50),
            release(100, 50),
            moved(150, 90),
        ]);

        let region = select_region(&mut overlay, &frame).unwrap();
        assert_eq!(region, Some(Rect::new(1, 1, 99, 49)));
        assert_eq!(overlay.blits.first(), Some(&frame.bounds()));
        assert_eq!(overlay.outlines.last(), Some(&Rect::new(1, 1, 99, 49)));
        assert_eq!(overlay.presents, 3);
        // the trailing motion after release is never consumed
        assert_eq!(overlay.events.len(), 1);
    }

    #[test]
    fn session_treats_empty_selection_as_cancelled() {
        let frame = pattern(50, 50);
        let mut overlay = ScriptedOverlay::with(&[press(10, 10), moved(10, 10), release(10, 10)]);
        assert_eq!(select_region(&mut overlay, &frame).unwrap(), None);
    }

    #[test]
    fn session_clips_selection_to_frame() {
        let frame = pattern(50, 40);
        let mut overlay = ScriptedOverlay::with(&[press(10, 10), moved(80, 90), release(80, 90)]);
        assert_eq!(
            select_region(&mut overlay, &frame).unwrap(),
            Some(Rect::new(10, 10, 40, 30))
        );
    }

    #[test]
    fn session_cancels_on_key_or_close() {
        let frame = pattern(50, 50);
        let mut overlay = ScriptedOverlay::with(&[press(5, 5), moved(20, 20), Event::KeyPressed]);
        assert_eq!(select_region(&mut overlay, &frame).unwrap(), None);

        let mut closed = ScriptedOverlay::with(&[press(5, 5), moved(20, 20)]);
        assert_eq!(select_region(&mut closed, &frame).unwrap(), None);
    }

    #[test]
    fn session_regrabs_on_focus_loss() {
        let frame = pattern(50, 50);
        let mut overlay = ScriptedOverlay::with(&[Event::FocusLost, Event::KeyPressed]);
        assert_eq!(select_region(&mut overlay, &frame).unwrap(), None);
        assert_eq!(overlay.grabs, 1);
    }
}
