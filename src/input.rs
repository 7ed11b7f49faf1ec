use egui::{Pos2, Rect, Response};

use crate::state::EditorContext;

/// Canvas input, in canvas pixel coordinates (origin at the top-left corner)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A drag started on the canvas
    PointerDown { position: Pos2 },
    /// The pointer moved while the drag is held
    PointerMove { position: Pos2 },
    /// The drag ended
    PointerUp,
}

/// Pointer state of the canvas widget for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
    /// Screen position of the pointer, if known
    pub position: Option<Pos2>,
}

impl PointerSample {
    pub fn from_response(response: &Response) -> Self {
        Self {
            pressed: response.drag_started(),
            held: response.dragged(),
            released: response.drag_stopped(),
            position: response.interact_pointer_pos(),
        }
    }
}

/// Converts raw pointer samples on the canvas widget into [`InputEvent`]s
pub struct InputHandler {
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self { canvas_rect }
    }

    /// Map a screen position to canvas coordinates
    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        (screen - self.canvas_rect.min).to_pos2()
    }

    pub fn events(&self, sample: PointerSample) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if let Some(screen) = sample.position {
            let position = self.to_canvas(screen);
            if sample.pressed {
                // Only strokes that start on the canvas count
                if self.canvas_rect.contains(screen) {
                    events.push(InputEvent::PointerDown { position });
                }
            } else if sample.held {
                events.push(InputEvent::PointerMove { position });
            }
        }

        if sample.released {
            events.push(InputEvent::PointerUp);
        }
        events
    }

    /// Feed `events` to the active layer of `context`
    pub fn apply(events: &[InputEvent], context: &mut EditorContext) {
        for event in events {
            match *event {
                InputEvent::PointerDown { position } => context.begin_stroke(position),
                InputEvent::PointerMove { position } => context.extend_stroke(position),
                InputEvent::PointerUp => context.end_stroke(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaintConfig;

    fn handler() -> InputHandler {
        InputHandler::new(Rect::from_min_size(Pos2::new(100.0, 50.0), egui::vec2(200.0, 100.0)))
    }

    #[test]
    fn test_positions_are_canvas_local() {
        let events = handler().events(PointerSample {
            pressed: true,
            position: Some(Pos2::new(110.0, 60.0)),
            ..Default::default()
        });
        assert_eq!(events, vec![InputEvent::PointerDown { position: Pos2::new(10.0, 10.0) }]);
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let events = handler().events(PointerSample {
            pressed: true,
            position: Some(Pos2::new(10.0, 10.0)),
            ..Default::default()
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_drag_produces_a_stroke() {
        let handler = handler();
        let mut context = EditorContext::new(PaintConfig::default());

        let frames = [
            PointerSample { pressed: true, position: Some(Pos2::new(120.0, 70.0)), ..Default::default() },
            PointerSample { held: true, position: Some(Pos2::new(130.0, 70.0)), ..Default::default() },
            // Moving off the canvas keeps extending the stroke
            PointerSample { held: true, position: Some(Pos2::new(400.0, 70.0)), ..Default::default() },
            PointerSample { released: true, position: None, ..Default::default() },
        ];
        for sample in frames {
            let events = handler.events(sample);
            InputHandler::apply(&events, &mut context);
        }

        let strokes = context.document().active_layer().strokes();
        assert_eq!(strokes.len(), 1);
        assert_eq!(
            strokes[0].points(),
            &[Pos2::new(20.0, 20.0), Pos2::new(30.0, 20.0), Pos2::new(300.0, 20.0)]
        );
    }
}
