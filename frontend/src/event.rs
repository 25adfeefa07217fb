use pathrace::{Command, Direction};

/// Maps a key press to a game command
pub fn command_from_key(key: egui::Key) -> Option<Command> {
    match key {
        egui::Key::ArrowRight => Some(Command::Move(Direction::Right)),
        egui::Key::ArrowDown => Some(Command::Move(Direction::Down)),
        egui::Key::ArrowLeft => Some(Command::Move(Direction::Left)),
        egui::Key::ArrowUp => Some(Command::Move(Direction::Up)),
        egui::Key::Escape => Some(Command::Quit),
        _ => None,
    }
}

/// Collects the commands of everything that happened since the last frame, in order. Held keys
/// do not repeat.
pub fn poll(ctx: &egui::Context) -> Vec<Command> {
    ctx.input(|i| {
        let mut commands: Vec<Command> = i
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } => command_from_key(*key),
                _ => None,
            })
            .collect();

        if i.viewport().close_requested() {
            commands.push(Command::Quit);
        }
        commands
    })
}
