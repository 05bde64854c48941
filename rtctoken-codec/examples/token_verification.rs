use rtctoken_codec::{
    generate_channel_token, generate_token, inspect_token, verify_channel_token, verify_token,
    AccessToken, AppCertificate, Privilege, Role, RtcService, TokenContent, TokenError,
    TokenTimeConfig,
};

const APP_ID: &str = "970ca35de60c44645bbae8a215061b33";
const APP_CERTIFICATE: &str = "5cfd2fd1755d40ecb72977518be15d3b";

fn main() -> Result<(), TokenError> {
    let certificate = AppCertificate::from_hex(APP_CERTIFICATE)?;

    // Example 1: Host token in the default revision
    println!("Example 1: Host token (007)");
    let token = generate_token(APP_ID, APP_CERTIFICATE, "lobby", 2882341273u32, Role::Host, 3600)?;
    println!("Generated token: {}", token);
    let content = verify_token(&token, &certificate)?;
    println!("✅ Verified, expires at {}\n", content.expires_at());

    // Example 2: Legacy revision, verified against its channel and uid
    println!("Example 2: Audience token (006)");
    let token = generate_channel_token(APP_ID, APP_CERTIFICATE, "lobby", 7u32, Role::Audience, 600)?;
    println!("Generated token: {}", token);
    verify_channel_token(&token, &certificate, "lobby", 7u32)?;
    println!("✅ Verified");
    match verify_channel_token(&token, &certificate, "other-room", 7u32) {
        Ok(_) => println!("❌ Unexpected: token accepted for another channel\n"),
        Err(e) => println!("✅ Rejected for another channel: {}\n", e),
    }

    // Example 3: Custom privilege windows with the builder
    println!("Example 3: Custom privileges");
    let now = chrono::Utc::now().timestamp() as u64;
    let mut builder = AccessToken::new(APP_ID, APP_CERTIFICATE, TokenTimeConfig::with_duration(86400))?;
    builder.add_service(
        RtcService::new("stage", "speaker-1")
            .with_privilege(Privilege::JoinChannel, now + 86400)
            .with_privilege(Privilege::PublishAudioStream, now + 1800),
    );
    let token = builder.build()?;

    // Example 4: Inspection without the certificate
    println!("Example 4: Inspect");
    if let TokenContent::Access(content) = inspect_token(&token)? {
        for service in &content.services {
            for (privilege, expire_at) in service.privileges().iter() {
                println!("  {} until {}", privilege, expire_at);
            }
        }
    }

    // Example 5: Wrong certificate
    let wrong = AppCertificate::from_hex(&"ff".repeat(16))?;
    match verify_token(&token, &wrong) {
        Ok(_) => println!("❌ Unexpected: token verified with the wrong certificate"),
        Err(e) => println!("✅ Wrong certificate rejected: {}", e),
    }

    Ok(())
}
