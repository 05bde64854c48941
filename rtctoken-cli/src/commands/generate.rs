use crate::cli::GenerateArgs;
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use colored::Colorize;
use rtctoken::{inspect_token, TokenConfig, TokenContent, TokenIssuer, DEFAULT_EXPIRE_AFTER};
use serde_json::json;
use tracing::debug;

use super::user_id_from;

pub fn handle_generate(args: GenerateArgs, json_output: bool, verbose: bool) -> Result<()> {
    let config = CliConfig::load()?;

    let app_id = config.resolve_app_id(args.app_id)?;
    let app_certificate = args.app_certificate.ok_or_else(|| {
        CliError::Config(
            "No app certificate given.\n\nPass --app-certificate or set RTCTOKEN_APP_CERTIFICATE"
                .to_string(),
        )
    })?;
    let profile = args.profile.or(config.default_profile).unwrap_or_default();
    let expires = args
        .expires
        .or(config.default_expires)
        .unwrap_or(DEFAULT_EXPIRE_AFTER);
    let role = args.role.or(config.default_role).unwrap_or_default();
    let user_id = user_id_from(args.uid, args.account);

    let token_config = TokenConfig::builder()
        .app_id(&app_id)
        .app_certificate(app_certificate)
        .profile(profile)
        .expire_after(expires)
        .default_role(role)
        .build()?;
    debug!(?token_config, "resolved token configuration");

    let issuer = TokenIssuer::new(token_config)?;
    let token = issuer.issue(&args.channel, user_id.clone(), role)?;

    let expires_at = match inspect_token(&token)? {
        TokenContent::Access(content) => content.expires_at(),
        TokenContent::Channel(content) => content.expire_at as u64,
    };

    if args.token_only {
        // In token-only mode, just output the raw token (perfect for piping)
        println!("{token}");
    } else if json_output {
        let output = json!({
            "success": true,
            "token": token,
            "version": profile,
            "app_id": app_id,
            "channel": args.channel,
            "uid": user_id,
            "role": role,
            "expires_in": expires,
            "expires_at": expires_at,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "✓ Token generated!".green());
        println!("  Version: {profile}");
        println!("  Channel: {}", args.channel.bright_cyan());
        if user_id.is_auto() {
            println!("  User: {}", "(assigned on join)".yellow());
        } else {
            println!("  User: {}", user_id.as_str().bright_cyan());
        }
        println!("  Role: {role}");
        println!("  Expires in: {expires} seconds");
        if verbose {
            println!("  App ID: {app_id}");
            println!("  Expires at: {expires_at} (unix)");
        }

        println!("\n{}", "Token:".bright_cyan());
        println!("{token}");
    }

    Ok(())
}
