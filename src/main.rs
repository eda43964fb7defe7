// SPDX-License-Identifier: MPL-2.0
use iced_lazy_img::app::{self, Flags};
use iced_lazy_img::config;

const HELP: &str = "\
Lazy image demo

USAGE:
  iced_lazy_img [OPTIONS] [SRC]

OPTIONS:
  --src <URL>                 Image URL or path
  --srcset <LIST>             Candidates, e.g. \"a.jpg 1x, a@2x.jpg 2x\"
  --sizes <LIST>              Slot sizes for width descriptors
  --placeholder <URL>         Shown until the image is ready
  --fit <FIT>                 cover | fill | contain | none | scale-down
  --position <POS>            e.g. \"left top\" or \"30% 70%\"
  --ratio <RATIO>             Width / height, e.g. 16/9
  --width <LEN>               e.g. 320, 320px or 100%
  --height <LEN>              e.g. 240, 240px or 100%
  --eager                     Fetch before the image is revealed
  --no-spinner                Hide the loading spinner
  --config-dir <DIR>          Directory holding settings.toml
  --export-diagnostics <FILE> Where the Export button writes
  -h, --help                  Print this help
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let config_dir: Option<String> = args.opt_value_from_str("--config-dir")?;
    config::paths::init_cli_override(config_dir.clone());

    let mut flags = Flags {
        src: args.opt_value_from_str("--src")?,
        srcset: args.opt_value_from_str("--srcset")?,
        sizes: args.opt_value_from_str("--sizes")?,
        placeholder: args.opt_value_from_str("--placeholder")?,
        fit: args.opt_value_from_str("--fit")?,
        position: args.opt_value_from_str("--position")?,
        ratio: args.opt_value_from_str("--ratio")?,
        width: args.opt_value_from_str("--width")?,
        height: args.opt_value_from_str("--height")?,
        eager: args.contains("--eager"),
        no_spinner: args.contains("--no-spinner"),
        config_dir,
        export_diagnostics: args.opt_value_from_str("--export-diagnostics")?,
    };

    if flags.src.is_none() {
        flags.src = args
            .finish()
            .into_iter()
            .next()
            .and_then(|s| s.into_string().ok());
    }

    app::run(flags)
}
