use clap::Parser;
use wasm_bindgen::prelude::*;

mod game;
mod leaflet;
mod locate;
mod map;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(flatten)]
    game: game::GameProps,
}

/// Arguments come from the location hash, e.g. `#-vv&--teleport`.
fn parse_args(location_hash: &str) -> Result<Args, clap::Error> {
    Args::try_parse_from(location_hash.split(['#', '&']))
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = parse_args(&location_hash).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    log::debug!("args: {:?}", args);

    let root = document()
        .get_element_by_id("app")
        .expect("Could not find id=\"app\" element");

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(root, args.game).render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hash_uses_defaults() {
        let args = parse_args("").unwrap();

        assert_eq!(args.game.neighborhood_size, None);
        assert!(!args.game.teleport);
    }

    #[test]
    fn hash_arguments_are_split_on_ampersands() {
        let args = parse_args("#--neighborhood-size=4&--teleport").unwrap();

        assert_eq!(args.game.neighborhood_size, Some(4));
        assert!(args.game.teleport);
    }

    #[test]
    fn unknown_hash_arguments_are_rejected() {
        assert!(parse_args("#--no-such-flag").is_err());
    }
}
