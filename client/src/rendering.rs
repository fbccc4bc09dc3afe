use crate::game::{GameMachine, Screen, Session};
use crate::layout::{buttons, Action, Button};
use macroquad::prelude::*;
use shared::{Field, OBSTACLE_HEIGHT, OBSTACLE_WIDTH};

const SKY: Color = Color::new(0.44, 0.77, 0.81, 1.0);
const GROUND: Color = Color::new(0.87, 0.84, 0.59, 1.0);
const PIPE: Color = Color::new(0.45, 0.75, 0.18, 1.0);
const BUTTON_FILL: Color = Color::new(0.98, 0.62, 0.16, 1.0);

/// Body colour per skin variant
const SKIN_COLORS: [Color; 9] = [
    YELLOW, ORANGE, RED, PINK, PURPLE, BLUE, SKYBLUE, LIME, BROWN,
];

pub fn skin_color(skin: Option<u32>) -> Color {
    skin.and_then(|v| SKIN_COLORS.get(v as usize).copied())
        .unwrap_or(YELLOW)
}

pub struct Renderer {
    field: Field,
}

impl Renderer {
    pub fn new(field: Field) -> Self {
        Renderer { field }
    }

    pub fn render(&self, machine: &GameMachine) {
        clear_background(SKY);

        if let Some(session) = machine.session() {
            if matches!(machine.screen(), Screen::Play | Screen::GameOver) {
                self.draw_session(session, machine.skin());
            }
        }
        self.draw_ground();

        match machine.screen() {
            Screen::ModeSelect => self.draw_title("Flappy Quakks"),
            Screen::Welcome => self.draw_title(machine.mode().label()),
            Screen::Play => {}
            Screen::GameOver => {
                let score = machine.session().map_or(0, |s| s.score);
                self.draw_title("Game Over");
                self.draw_centered(&format!("Score: {}", score), self.field.height * 0.4, 32.0);
            }
            Screen::PickSkin => self.draw_title("Pick your Quakk"),
            Screen::Leaderboard => self.draw_leaderboard(machine),
        }

        for button in buttons(machine.screen(), &self.field) {
            self.draw_button(&button, machine);
        }
    }

    fn draw_session(&self, session: &Session, skin: Option<u32>) {
        for obstacle in session.obstacles.obstacles() {
            draw_rectangle(
                obstacle.x,
                obstacle.gap_y - OBSTACLE_HEIGHT,
                OBSTACLE_WIDTH,
                OBSTACLE_HEIGHT,
                PIPE,
            );
            draw_rectangle(
                obstacle.x,
                obstacle.gap_y + session.params.gap_size,
                OBSTACLE_WIDTH,
                OBSTACLE_HEIGHT,
                PIPE,
            );
        }

        let entity = &session.entity;
        draw_rectangle(entity.x, entity.y, entity.width, entity.height, skin_color(skin));
        draw_rectangle_lines(entity.x, entity.y, entity.width, entity.height, 2.0, BLACK);

        draw_text(&session.score.to_string(), 20.0, 50.0, 48.0, WHITE);
    }

    fn draw_ground(&self) {
        let top = self.field.ground_line();
        draw_rectangle(0.0, top, self.field.width, self.field.height - top, GROUND);
    }

    fn draw_title(&self, text: &str) {
        self.draw_centered(text, self.field.height * 0.25, 48.0);
    }

    fn draw_centered(&self, text: &str, y: f32, size: f32) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(text, (self.field.width - dims.width) / 2.0, y, size, WHITE);
    }

    fn draw_button(&self, button: &Button, machine: &GameMachine) {
        let r = button.rect;
        let fill = match (machine.screen(), button.action) {
            (Screen::PickSkin, Action::PickSkin(variant)) => {
                skin_color(Some(variant))
            }
            _ => BUTTON_FILL,
        };
        draw_rectangle(r.x, r.y, r.w, r.h, fill);
        draw_rectangle_lines(r.x, r.y, r.w, r.h, 2.0, BLACK);

        let dims = measure_text(&button.label, None, 24, 1.0);
        draw_text(
            &button.label,
            r.x + (r.w - dims.width) / 2.0,
            r.y + (r.h + dims.height) / 2.0,
            24.0,
            BLACK,
        );
    }

    fn draw_leaderboard(&self, machine: &GameMachine) {
        self.draw_title(&format!("{} Top 10", machine.mode().label()));

        let entries = machine.leaderboard();
        if entries.is_empty() {
            self.draw_centered("No scores yet", self.field.height * 0.4, 28.0);
        }
        for (i, entry) in entries.iter().enumerate() {
            let y = self.field.height * 0.35 + i as f32 * 32.0;
            let line = format!("{:>2}. {:<16} {}", i + 1, entry.username, entry.score);
            draw_text(&line, self.field.width * 0.15, y, 28.0, WHITE);
        }

        self.draw_centered("Tap to continue", self.field.height * 0.8, 24.0);
    }
}
