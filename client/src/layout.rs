//! Button regions for every screen, shared by hit-testing and drawing

use crate::game::Screen;
use shared::{Field, Mode, Rect, SKIN_VARIANTS};

pub const BUTTON_WIDTH: f32 = 150.0;
pub const BUTTON_HEIGHT: f32 = 50.0;

pub const SKIN_COLUMNS: u32 = 3;
pub const SKIN_CELL: f32 = 80.0;
pub const SKIN_PADDING: f32 = 20.0;
/// Top of the skin grid as a fraction of field height
const SKIN_GRID_TOP_RATIO: f32 = 0.25;

/// What a button does when tapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectMode(Mode),
    OpenSkinPicker,
    Start,
    OpenLeaderboard,
    Back,
    PickSkin(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub action: Action,
    pub rect: Rect,
    pub label: String,
}

impl Button {
    fn new(action: Action, rect: Rect, label: impl Into<String>) -> Self {
        Self {
            action,
            rect,
            label: label.into(),
        }
    }
}

/// A column of buttons centred horizontally, stacked at 60%, 70%, 80% of the height
fn stacked(field: &Field, items: Vec<(Action, &str)>) -> Vec<Button> {
    let x = field.width / 2.0 - BUTTON_WIDTH / 2.0;
    items
        .into_iter()
        .enumerate()
        .map(|(i, (action, label))| {
            let y = field.height * (0.6 + i as f32 * 0.1);
            Button::new(action, Rect::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT), label)
        })
        .collect()
}

/// Cell of skin `variant` in the picker grid
pub fn skin_cell(field: &Field, variant: u32) -> Rect {
    let grid_width =
        SKIN_COLUMNS as f32 * SKIN_CELL + (SKIN_COLUMNS - 1) as f32 * SKIN_PADDING;
    let left = (field.width - grid_width) / 2.0;
    let top = field.height * SKIN_GRID_TOP_RATIO;

    let col = (variant % SKIN_COLUMNS) as f32;
    let row = (variant / SKIN_COLUMNS) as f32;
    Rect::new(
        left + col * (SKIN_CELL + SKIN_PADDING),
        top + row * (SKIN_CELL + SKIN_PADDING),
        SKIN_CELL,
        SKIN_CELL,
    )
}

/// Every tappable region on `screen`
pub fn buttons(screen: Screen, field: &Field) -> Vec<Button> {
    match screen {
        Screen::ModeSelect => stacked(
            field,
            vec![
                (Action::SelectMode(Mode::Classic), Mode::Classic.label()),
                (Action::SelectMode(Mode::SpeedRun), Mode::SpeedRun.label()),
                (Action::OpenSkinPicker, "Pick Quakk"),
            ],
        ),
        Screen::Welcome => stacked(
            field,
            vec![
                (Action::Start, "Start"),
                (Action::OpenLeaderboard, "Leaderboard"),
                (Action::Back, "Back"),
            ],
        ),
        Screen::GameOver => {
            let y = field.height * 0.6;
            vec![
                Button::new(
                    Action::Start,
                    Rect::new(field.width / 2.0 - 160.0, y, BUTTON_WIDTH, BUTTON_HEIGHT),
                    "Play Again",
                ),
                Button::new(
                    Action::OpenLeaderboard,
                    Rect::new(field.width / 2.0 + 10.0, y, BUTTON_WIDTH, BUTTON_HEIGHT),
                    "Leaderboard",
                ),
            ]
        }
        Screen::PickSkin => (0..SKIN_VARIANTS)
            .map(|variant| {
                Button::new(
                    Action::PickSkin(variant),
                    skin_cell(field, variant),
                    format!("{}", variant + 1),
                )
            })
            .collect(),
        Screen::Play | Screen::Leaderboard => Vec::new(),
    }
}

/// The action under the pointer, if any
pub fn hit_test(screen: Screen, field: &Field, x: f32, y: f32) -> Option<Action> {
    buttons(screen, field)
        .into_iter()
        .find(|button| button.rect.contains(x, y))
        .map(|button| button.action)
}
