//! Server harness and shared world for drawing behaviour tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The `WorldFixture` ensures the server
//! is stopped even if a test panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;

use actix_web::HttpServer;
use actix_web::dev::ServerHandle;
use actix_web::http::Method;
use actix_web::http::header::AUTHORIZATION;
use awc::Client;
use drawings::domain::{AccessKey, REQUEST_ID_HEADER};
use drawings::middleware::{AuthConfig, CorsConfig};
use drawings::server::{build_app, in_memory_state};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) const ACCESS_KEY: &str = "bdd-shared-secret";

struct RunningServer {
    base_url: String,
    handle: ServerHandle,
}

/// Last observed HTTP exchange.
#[derive(Debug, Default)]
pub(crate) struct Exchange {
    pub(crate) status: Option<u16>,
    pub(crate) request_id: Option<String>,
    pub(crate) body: Option<Value>,
}

pub(crate) struct DrawingsWorld {
    runtime: Runtime,
    local: LocalSet,
    server: Option<RunningServer>,
    pub(crate) bearer: Option<String>,
    pub(crate) last: Exchange,
    pub(crate) drawing_id: Option<String>,
    pub(crate) created: Option<Value>,
}

pub(crate) type SharedWorld = Rc<RefCell<DrawingsWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(&self.world);
    }
}

fn shutdown(world: &SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we lock the world
    // while calling `block_on`. The future must not try to lock the world.
    let mut ctx = world.borrow_mut();
    let Some(server) = ctx.server.take() else {
        return;
    };
    ctx.local.block_on(&ctx.runtime, async move {
        server.handle.stop(true).await;
    });
}

fn spawn_server(auth: AuthConfig) -> Result<RunningServer, String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    let state = in_memory_state();

    let server = HttpServer::new(move || {
        build_app(state.clone(), CorsConfig::default(), auth.clone())
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok(RunningServer {
        base_url: format!("http://{addr}"),
        handle,
    })
}

/// Start a server on an ephemeral port, replacing any running one.
pub(crate) fn start_server(world: &SharedWorld, auth_enabled: bool) {
    shutdown(world);
    let auth = if auth_enabled {
        AuthConfig::enabled(AccessKey::new(ACCESS_KEY.to_owned()).expect("non-empty key"))
    } else {
        AuthConfig::disabled()
    };
    let mut ctx = world.borrow_mut();
    let server = ctx
        .local
        .block_on(&ctx.runtime, async move { spawn_server(auth) })
        .expect("server should start");
    ctx.server = Some(server);
}

/// A request issued by a step.
pub(crate) struct RequestSpec<'a> {
    pub(crate) method: Method,
    pub(crate) path: &'a str,
    pub(crate) payload: Option<Value>,
}

/// Send `request` with the world's bearer credential and record the exchange.
pub(crate) fn perform(world: &SharedWorld, request: RequestSpec<'_>) {
    let RequestSpec {
        method,
        path,
        payload,
    } = request;
    let exchange = {
        let ctx = world.borrow();
        let base_url = ctx
            .server
            .as_ref()
            .map(|server| server.base_url.clone())
            .expect("server should be running");
        let bearer = ctx.bearer.clone();
        let url = format!("{base_url}{path}");
        ctx.local.block_on(&ctx.runtime, async move {
            let mut request = Client::default().request(method, url);
            if let Some(token) = bearer {
                request = request.insert_header((AUTHORIZATION, format!("Bearer {token}")));
            }
            let mut response = match payload {
                Some(payload) => request.send_json(&payload).await,
                None => request.send().await,
            }
            .expect("request should complete");
            let status = response.status().as_u16();
            let request_id = response
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let bytes = response.body().await.expect("response body");
            let body = (!bytes.is_empty())
                .then(|| serde_json::from_slice(&bytes).expect("JSON body"));
            Exchange {
                status: Some(status),
                request_id,
                body,
            }
        })
    };
    world.borrow_mut().last = exchange;
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    WorldFixture {
        world: Rc::new(RefCell::new(DrawingsWorld {
            runtime,
            local,
            server: None,
            bearer: None,
            last: Exchange::default(),
            drawing_id: None,
            created: None,
        })),
    }
}
