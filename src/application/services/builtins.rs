//! Built-in commands that work the same on every backend

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex_lite::Regex;

use crate::application::errors::{CommandError, DeclarationError};
use crate::domain::entities::{AuthorizedRoles, Command, CommandBuilder};
use crate::infrastructure::config::Config;

const BASE_RANGE: &str = "Invalid base(s); base 2 to base 36 are supported";
const D6: [&str; 6] = ["⚀", "⚁", "⚂", "⚃", "⚄", "⚅"];
const MOJANG_PROFILE_URL: &str = "https://api.mojang.com/users/profiles/minecraft/";

static DIE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d*)d(\d+)$").expect("die pattern is valid"));

/// All built-in commands for the given configuration, keyed by name.
pub fn commands(config: &Config) -> Result<HashMap<String, Command>, DeclarationError> {
    let mut commands = HashMap::new();
    commands.insert("conv".to_string(), convert()?);

    let bases = [("b", 2), ("o", 8), ("d", 10), ("h", 16)];
    for (old_name, old_base) in bases {
        for (new_name, new_base) in bases {
            commands.insert(
                format!("{}2{}", old_name, new_name),
                short_convert(old_base, new_base)?,
            );
        }
    }

    commands.insert("poll".to_string(), poll()?);
    commands.insert("roll".to_string(), roll()?);
    commands.insert("lmgtfy".to_string(), lmgtfy()?);
    commands.insert("apply".to_string(), apply()?);
    commands.insert("insult".to_string(), insult(config.insults.clone()));
    commands.insert("rng".to_string(), rng()?);
    commands.insert("uuid".to_string(), uuid()?);
    commands.insert(
        "authorized".to_string(),
        authorized(config.authorized_roles.to_roles()),
    );
    Ok(commands)
}

fn base_convert(old: u32, new: u32, num: &str) -> String {
    if !(2..=36).contains(&old) || !(2..=36).contains(&new) {
        return BASE_RANGE.to_string();
    }
    match i64::from_str_radix(num, old) {
        Ok(value) => to_radix(value, new),
        Err(e) => format!("Invalid number: {}", e),
    }
}

fn to_radix(value: i64, radix: u32) -> String {
    let mut n = value.unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let radix = u64::from(radix);
    let mut digits = Vec::new();
    while n > 0 {
        // n % radix < 36, always a valid digit
        digits.extend(char::from_digit((n % radix) as u32, radix as u32));
        n /= radix;
    }
    if value < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

pub fn convert() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new().help("Converts a number between bases 2 to 36.");
    let old_base = cmd.required("oldBase")?;
    let new_base = cmd.required("newBase")?;
    let num = cmd.required("num")?;
    Ok(cmd.reply(false, move |scope| {
        let old = scope.get(old_base).parse::<u32>();
        let new = scope.get(new_base).parse::<u32>();
        Ok(match (old, new) {
            (Ok(old), Ok(new)) => base_convert(old, new, scope.get(num)),
            _ => BASE_RANGE.to_string(),
        })
    }))
}

pub fn short_convert(old: u32, new: u32) -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new();
    let num = cmd.required("num")?;
    Ok(cmd.reply(false, move |scope| Ok(base_convert(old, new, scope.get(num)))))
}

/// Keycap emoji for 1..=9.
fn number_emoji(n: usize) -> String {
    format!("{}\u{FE0F}\u{20E3}", n)
}

pub fn poll() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new().help("Starts a poll with up to 9 options.");
    let question = cmd.required("question")?;
    let options = cmd.vararg("options")?;
    Ok(cmd.reply(false, move |scope| {
        let options = scope.args.get(options);
        if options.is_empty() {
            return Ok("Polls must have at least 1 option".to_string());
        }
        if options.len() > 9 {
            return Ok("Polls can't have more than 9 options.".to_string());
        }
        let mut lines = vec![format!("Poll: {}", scope.args.get(question))];
        for (i, option) in options.iter().enumerate() {
            let emoji = number_emoji(i + 1);
            lines.push(format!("{} {}", emoji, option));
            scope.reactions.push(emoji);
        }
        Ok(lines.join("\n"))
    }))
}

fn parse_die(die: &str) -> Option<(u32, u32)> {
    let caps = DIE.captures(die)?;
    let repeat = match &caps[1] {
        "" => 1,
        r => r.parse::<u32>().ok()?.clamp(1, 20),
    };
    let kind = caps[2].parse::<u32>().ok()?.clamp(2, 128);
    Some((repeat, kind))
}

pub fn roll() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new()
        .help("NdT where N is the number and T is the type of die. Sample: ,roll 2d6+10d12.");
    let dice = cmd.optional("dice")?;
    Ok(cmd.reply(false, move |scope| {
        let mut rng = rand::thread_rng();
        let dice = match scope.get(dice) {
            None => return Ok(D6[rng.gen_range(0..D6.len())].to_string()),
            Some("rick") => return Ok(scope.link("https://youtu.be/dQw4w9WgXcQ")),
            Some(dice) => dice,
        };

        let mut reply = String::new();
        for die in dice.split('+') {
            let Some((repeat, kind)) = parse_die(die) else {
                return Ok("Invalid dice format.".to_string());
            };
            let values: Vec<u32> = (0..repeat).map(|_| rng.gen_range(1..=kind)).collect();
            let sum: u32 = values.iter().sum();
            let rolled = values
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            reply.push_str(&format!(
                "\n**d{}** rolled **{}** time(s): `{}` (**{}**)",
                kind, repeat, rolled, sum
            ));
        }
        Ok(reply)
    }))
}

pub fn lmgtfy() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new();
    let search = cmd.vararg("search")?;
    Ok(cmd.reply(false, move |scope| {
        let search = scope.get(search);
        if search.is_empty() {
            return Ok("No query provided!".to_string());
        }
        let query = search
            .iter()
            .map(|term| urlencoding::encode(term).into_owned())
            .collect::<Vec<_>>()
            .join("%20");
        Ok(format!("<https://letmegoogleforyou.com/?q={}>", query))
    }))
}

pub fn apply() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new().help("Instructions to apply.");
    let arg = cmd.required("arg")?;
    Ok(cmd.reply(false, move |scope| {
        Ok(match scope.get(arg) {
            "student" => {
                "To apply for student, hop onto `mc.openredstone.org` and run `/apply`".to_string()
            }
            "builder" => format!(
                "To apply for builder, follow the steps outlined here: {}",
                scope.link("https://discourse.openredstone.org/builder")
            ),
            "engineer" => format!(
                "To apply for engineer, follow the steps outlined here: {}",
                scope.link("https://discourse.openredstone.org/engineer")
            ),
            _ => "Specify \"student\", \"builder\", or \"engineer\".".to_string(),
        })
    }))
}

pub fn insult(insults: Vec<String>) -> Command {
    CommandBuilder::new().reply(false, move |scope| {
        Ok(match insults.choose(&mut rand::thread_rng()) {
            Some(insult) => insult.replace("%USER%", &scope.sender.username),
            None => "I'm out of insults.".to_string(),
        })
    })
}

pub fn rng() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new().help("Generates a random bit string of the given length.");
    let bits = cmd.required("bits")?;
    Ok(cmd.reply(false, move |scope| {
        let length = match scope.get(bits).parse::<u32>() {
            Ok(length) => length,
            Err(_) => return Ok("Invalid bit length! I'm expecting an integer.".to_string()),
        };
        if length > 64 {
            return Ok("That's probably too much".to_string());
        }
        let mut rng = rand::thread_rng();
        Ok((0..length)
            .map(|_| if rng.gen::<bool>() { '1' } else { '0' })
            .collect())
    }))
}

/// Mojang returns the id without dashes.
fn dashed_uuid(raw: &str) -> Option<String> {
    if raw.len() != 32 || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    ))
}

pub fn uuid() -> Result<Command, DeclarationError> {
    let mut cmd = CommandBuilder::new().help("Looks up the UUID of a Minecraft username.");
    let name = cmd.required("name")?;
    Ok(cmd.reply(false, move |scope| {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CommandError::Network(e.to_string()))?;
        let url = format!("{}{}", MOJANG_PROFILE_URL, urlencoding::encode(scope.get(name)));
        let response = client
            .get(url)
            .send()
            .map_err(|e| CommandError::Network(e.to_string()))?;
        if response.status() != reqwest::StatusCode::OK {
            return Ok("Invalid username provided".to_string());
        }
        let body: serde_json::Value = response
            .json()
            .map_err(|e| CommandError::Network(e.to_string()))?;
        let raw = body["id"].as_str().unwrap_or_default();
        match dashed_uuid(raw) {
            Some(uuid) => Ok(format!("`{}`", uuid)),
            None => Err(CommandError::ExecutionFailed(format!(
                "unexpected profile id from Mojang: {:?}",
                raw
            ))),
        }
    }))
}

pub fn authorized(roles: AuthorizedRoles) -> Command {
    CommandBuilder::new()
        .roles(roles)
        .reply(false, |_| Ok("authorized !".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RoleRequirement, Sender};

    fn run(cmd: &Command, args: &[&str]) -> crate::domain::entities::Response {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        cmd.run(&Sender::new("tester"), &args).unwrap()
    }

    #[test]
    fn test_base_convert() {
        assert_eq!(base_convert(2, 10, "1010"), "10");
        assert_eq!(base_convert(10, 16, "255"), "ff");
        assert_eq!(base_convert(16, 2, "-f"), "-1111");
        assert_eq!(base_convert(10, 36, "0"), "0");
        assert_eq!(base_convert(1, 10, "1"), BASE_RANGE);
        assert!(base_convert(2, 10, "123").starts_with("Invalid number"));
    }

    #[test]
    fn test_conv_command() {
        let cmd = convert().unwrap();
        assert_eq!(run(&cmd, &["10", "2", "5"]).reply, "101");
        assert_eq!(run(&cmd, &["x", "2", "5"]).reply, BASE_RANGE);
        assert_eq!(run(&cmd, &["37", "2", "5"]).reply, BASE_RANGE);
    }

    #[test]
    fn test_short_convert_names() {
        let commands = commands(&Config::default()).unwrap();
        for name in ["b2o", "h2d", "d2d", "o2b"] {
            assert!(commands.contains_key(name), "missing {}", name);
        }
        assert_eq!(run(&commands["h2d"], &["ff"]).reply, "255");
    }

    #[test]
    fn test_poll() {
        let cmd = poll().unwrap();
        let response = run(&cmd, &["Lunch?", "pizza", "tacos"]);
        assert_eq!(
            response.reply,
            "Poll: Lunch?\n1\u{FE0F}\u{20E3} pizza\n2\u{FE0F}\u{20E3} tacos"
        );
        assert_eq!(response.reactions, vec![number_emoji(1), number_emoji(2)]);

        assert_eq!(run(&cmd, &["Lunch?"]).reply, "Polls must have at least 1 option");
        let many = ["q", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];
        let response = run(&cmd, &many);
        assert_eq!(response.reply, "Polls can't have more than 9 options.");
        assert!(response.reactions.is_empty());
    }

    #[test]
    fn test_parse_die() {
        assert_eq!(parse_die("d6"), Some((1, 6)));
        assert_eq!(parse_die("2d12"), Some((2, 12)));
        assert_eq!(parse_die("100d1000"), Some((20, 128)));
        assert_eq!(parse_die("0d1"), Some((1, 2)));
        assert_eq!(parse_die("d"), None);
        assert_eq!(parse_die("2x6"), None);
    }

    #[test]
    fn test_roll() {
        let cmd = roll().unwrap();
        assert!(D6.contains(&run(&cmd, &[]).reply.as_str()));
        assert_eq!(run(&cmd, &["rick"]).reply, "<https://youtu.be/dQw4w9WgXcQ>");
        assert_eq!(run(&cmd, &["2d6+nope"]).reply, "Invalid dice format.");

        let reply = run(&cmd, &["3d6+d20"]).reply;
        assert!(reply.starts_with("\n**d6** rolled **3** time(s): `"));
        assert!(reply.contains("\n**d20** rolled **1** time(s): `"));
    }

    #[test]
    fn test_lmgtfy() {
        let cmd = lmgtfy().unwrap();
        assert_eq!(
            run(&cmd, &["Open Redstone", "Engineers"]).reply,
            "<https://letmegoogleforyou.com/?q=Open%20Redstone%20Engineers>"
        );
        assert_eq!(run(&cmd, &[]).reply, "No query provided!");
    }

    #[test]
    fn test_apply() {
        let cmd = apply().unwrap();
        assert!(run(&cmd, &["student"]).reply.contains("apply for student"));
        assert!(run(&cmd, &["engineer"]).reply.contains("<https://discourse.openredstone.org/engineer>"));
        assert!(run(&cmd, &["fish"]).reply.starts_with("Specify"));
    }

    #[test]
    fn test_insult() {
        let cmd = insult(vec!["%USER% is a potato".to_string()]);
        assert_eq!(run(&cmd, &[]).reply, "tester is a potato");
        assert_eq!(run(&insult(Vec::new()), &[]).reply, "I'm out of insults.");
    }

    #[test]
    fn test_rng() {
        let cmd = rng().unwrap();
        let reply = run(&cmd, &["16"]).reply;
        assert_eq!(reply.len(), 16);
        assert!(reply.chars().all(|c| c == '0' || c == '1'));
        assert_eq!(run(&cmd, &["65"]).reply, "That's probably too much");
        assert!(run(&cmd, &["many"]).reply.starts_with("Invalid bit length"));
    }

    #[test]
    fn test_dashed_uuid() {
        assert_eq!(
            dashed_uuid("069a79f444e94726a5befca90e38aaf5").as_deref(),
            Some("069a79f4-44e9-4726-a5be-fca90e38aaf5")
        );
        assert_eq!(dashed_uuid("short"), None);
    }

    #[test]
    fn test_authorized() {
        let cmd = authorized(AuthorizedRoles::everywhere(RoleRequirement::restricted_to(["staff"])));
        assert!(run(&cmd, &[]).reply.contains("not authorized"));
    }
}
