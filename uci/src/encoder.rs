use super::commands::{GoParams, UciInput};

pub struct Encoder {}

impl Encoder {
    pub fn encode(&self, command: &UciInput) -> String {
        match command {
            UciInput::Uci => "uci".to_string(),
            UciInput::IsReady => "isready".to_string(),

            UciInput::SetOption { name, value } => {
                if value.is_empty() {
                    format!("setoption name {}", name)
                } else {
                    format!("setoption name {} value {}", name, value)
                }
            }
            UciInput::Position { fen } => format!("position fen {}", fen),
            UciInput::Go(params) => encode_go(params),

            UciInput::Stop => "stop".to_string(),
            UciInput::Quit => "quit".to_string(),
        }
    }
}

fn encode_go(params: &GoParams) -> String {
    let mut line = String::from("go");
    if params.infinite {
        line.push_str(" infinite");
    }
    line
}
