use crate::cli::VerifyArgs;
use crate::error::{CliError, Result};
use colored::Colorize;
use rtctoken::{
    decode, inspect_token, verify_channel_token, verify_token, AppCertificate, PrivilegeSet,
    Service, TokenContent, Version,
};
use serde_json::json;
use std::io::{self, Read};

use super::user_id_from;

fn read_token(token: Option<String>) -> Result<String> {
    let token = match token {
        Some(token) => token,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(CliError::InvalidInput("No token given".to_string()));
    }
    Ok(token)
}

fn print_privileges(privileges: &PrivilegeSet) {
    for (privilege, expire_at) in privileges.iter() {
        println!("      {privilege}: until {expire_at}");
    }
}

fn print_content(content: &TokenContent) {
    println!("  Version: {}", content.version());
    println!("  App ID: {}", content.app_id().bright_cyan());
    match content {
        TokenContent::Access(content) => {
            println!("  Salt: {}", content.salt);
            println!("  Issued at: {}", content.issue_ts);
            println!(
                "  Expires at: {} ({} seconds after issue)",
                content.expires_at(),
                content.expire
            );
            for service in &content.services {
                match service {
                    Service::Rtc(rtc) => {
                        println!("  Service: rtc");
                        println!("    Channel: {}", rtc.channel_name.bright_cyan());
                        if rtc.user_id.is_auto() {
                            println!("    User: {}", "(assigned on join)".yellow());
                        } else {
                            println!("    User: {}", rtc.user_id);
                        }
                        println!("    Privileges:");
                        print_privileges(&rtc.privileges);
                    }
                    other => println!("  Service: {:?}", other.service_type()),
                }
            }
        }
        TokenContent::Channel(content) => {
            println!("  Salt: {}", content.salt);
            println!("  Issued at: {}", content.issue_ts);
            println!("  Expires at: {}", content.expire_at);
            println!("  Privileges:");
            print_privileges(&content.privileges);
        }
    }
}

pub fn handle_inspect(token: Option<String>, json_output: bool) -> Result<()> {
    let token = read_token(token)?;
    let content = inspect_token(&token)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&content)?);
    } else {
        println!("{}", "Token contents:".bright_cyan());
        print_content(&content);
        println!(
            "\n{} The signature was not checked. Use `rtctoken verify` for that.",
            "!".yellow()
        );
    }

    Ok(())
}

pub fn handle_verify(args: VerifyArgs, json_output: bool) -> Result<()> {
    let token = read_token(Some(args.token))?;
    let certificate = AppCertificate::from_hex(&args.app_certificate)?;
    let user_id = user_id_from(args.uid, args.account);

    let content = match decode(&token)?.version {
        Version::V007 => {
            let content = verify_token(&token, &certificate)?;
            if let Some(ref channel) = args.channel {
                let matches = content.services.iter().any(|service| match service {
                    Service::Rtc(rtc) => &rtc.channel_name == channel && rtc.user_id == user_id,
                    _ => false,
                });
                if !matches {
                    return Err(CliError::VerificationFailed(format!(
                        "token has no service for channel '{channel}' and user '{user_id}'"
                    )));
                }
            }
            TokenContent::Access(content)
        }
        Version::V006 => {
            let channel = args.channel.as_deref().ok_or_else(|| {
                CliError::InvalidInput(
                    "006 tokens sign the channel and user; pass --channel and --uid or --account"
                        .to_string(),
                )
            })?;
            TokenContent::Channel(verify_channel_token(
                &token,
                &certificate,
                channel,
                user_id,
            )?)
        }
    };

    if json_output {
        let output = json!({
            "success": true,
            "content": content,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "✓ Token signature is valid".green());
        print_content(&content);
    }

    Ok(())
}
