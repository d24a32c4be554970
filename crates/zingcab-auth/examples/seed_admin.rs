//! Admin seeding helper
//!
//! Usage: cargo run --example seed_admin -p zingcab-auth -- <email> <password> [name]
//!
//! Prints the SQL inserting an administrator with an Argon2id password hash.

use zingcab_auth::PasswordService;

fn main() {
    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("usage: seed_admin <email> <password> [name]");
        std::process::exit(2);
    };
    let name = args.next().unwrap_or_else(|| "Administrator".to_string());

    let hash = match PasswordService::new().hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            eprintln!("failed to hash password: {}", e);
            std::process::exit(1);
        }
    };

    println!("INSERT INTO admins (email, password_hash, name)");
    println!("VALUES ('{}', '{}', '{}');", email, hash, name);
}
