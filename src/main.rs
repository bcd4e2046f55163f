use type_clash_arena::rocket_initialize;

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let rocket = match rocket_initialize() {
        Ok(rocket) => rocket,
        Err(e) => {
            log::error!("Refusing to launch: {}", e);
            std::process::exit(1);
        }
    };
    let _rocket = rocket.launch().await?;
    Ok(())
}
