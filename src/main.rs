mod cache;
mod config;
mod email;
mod error;
mod events;
mod guests;
mod model;
mod rsvp;
mod schema;
mod state;
mod store;
mod view;
mod visibility;
mod wishes;

use {
    crate::{
        config::{Args, Backend},
        email::Email,
        error::{error_handlers, Error, SubmitError},
        guests::GuestResolver,
        model::{Outcome, PageParams, WishParams},
        state::AppState,
        view::Page,
        visibility::Visibility,
        wishes::WishBook,
    },
    actix_files::Files,
    actix_web::{middleware, web, App, Error as ActixError, HttpResponse, HttpServer, Result},
    clap::Parser,
    log::{error, info},
    std::{io, time::Duration},
};

fn app_config(config: &mut web::ServiceConfig) {
    config.service(Files::new("/static", "static")).service(
        web::scope("")
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/rsvp").route(web::post().to(handle_rsvp)))
            .service(web::resource("/wish").route(web::post().to(handle_wish)))
            .service(web::resource("/wishes").route(web::get().to(list_wishes)))
            .wrap(error_handlers()),
    );
}

/// Return the invitation, personalised when `?to=` names a known guest
async fn index(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> Result<HttpResponse, ActixError> {
    let store = state.store.as_ref();
    let guest = match params.to.as_deref() {
        Some(code) => state.guests.resolve(store, code).await,
        None => None,
    };
    let wishes = state.wishes.list(store).await;
    let page = Page::new(&state.visibility, guest.as_ref(), wishes);
    let body = state.tt.render("index.html", &page).map_err(Error::from)?;
    Ok(HttpResponse::Ok().content_type("text/html").body(body))
}

/// Record a guest's answers for each of their events
async fn handle_rsvp(
    state: web::Data<AppState>,
    form: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let pairs = form.into_inner();
    match rsvp::submit(state.store.as_ref(), &state.guests, &pairs).await {
        Ok((guest, submission)) => {
            if let Err(error) = state
                .email
                .send_rsvp(&guest.name, &submission, state.test)
                .await
            {
                error!("Could not send confirmation email: {}", error);
            }
            HttpResponse::Ok().json(Outcome::ok())
        }
        Err(error) => {
            if matches!(error, SubmitError::Upstream(_)) {
                if let Err(send_error) = state
                    .email
                    .send_rsvp_error(&error.to_string(), &pairs, state.test)
                    .await
                {
                    error!(
                        "Could not send error email: {}, original error: {}",
                        send_error, error
                    );
                }
            }
            HttpResponse::Ok().json(Outcome::from(&error))
        }
    }
}

/// Add or replace a guest's wish
async fn handle_wish(state: web::Data<AppState>, params: web::Form<WishParams>) -> HttpResponse {
    let outcome = match state
        .wishes
        .submit(state.store.as_ref(), &state.guests, &params)
        .await
    {
        Ok(()) => Outcome::ok(),
        Err(error) => Outcome::from(&error),
    };
    HttpResponse::Ok().json(outcome)
}

async fn list_wishes(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.wishes.list(state.store.as_ref()).await)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let backend =
        Backend::from_args(&args).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let ttl = Duration::from_secs(args.cache_ttl);
    let guests = GuestResolver::new(ttl);
    let wishes = WishBook::new(ttl);
    let visibility = Visibility::new(args.rsvp_exempt.clone(), args.wedding_party.clone());
    let email = Email::new(
        args.from.as_deref().unwrap_or_default(),
        args.admin.as_deref().unwrap_or_default(),
    );
    if !email.enabled() {
        info!("No --from/--admin addresses, RSVP notifications are off");
    }
    let test = args.test;

    info!("Listening on {}", args.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(AppState::new(
                &backend,
                guests.clone(),
                wishes.clone(),
                visibility.clone(),
                email.clone(),
                test,
            )))
            .configure(app_config)
    })
    .bind(args.bind.as_str())?
    .run()
    .await
}
