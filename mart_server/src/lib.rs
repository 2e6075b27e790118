//! # Mart service
//!
//! The user-facing half of the loyalty platform. Users register and log in,
//! submit order numbers, and watch their balance grow as the order pipeline
//! mirrors results back from the accrual service.
//!
//! ## Authentication
//!
//! Sessions ride in an `userID` cookie: an AES-256-GCM envelope (random nonce
//! prepended, URL-safe base64) over the decimal user id, issued on register
//! and login and valid for eight hours. The [`middleware::SessionFactory`]
//! middleware opens the envelope, confirms the user still exists and parks
//! the id in the request extensions, where handlers pick it up through the
//! [`auth::AuthenticatedUser`] extractor.
//!
//! ## Routes
//!
//! | Method & path | Auth | Success | Domain errors |
//! |---|---|---|---|
//! | `POST /api/user/register` | no | 200 + cookie | 400 bad body, 409 login taken |
//! | `POST /api/user/login` | no | 200 + cookie | 400 bad body, 401 bad credentials |
//! | `POST /api/user/orders` | yes | 202 | 200 own duplicate, 400 empty, 409 foreign, 422 bad check digit |
//! | `GET /api/user/orders` | yes | 200 (list or `[]`) | |
//! | `GET /api/user/balance` | yes | 200 | |
//! | `POST /api/user/balance/withdraw` | yes | 200 | 400 bad sum/body, 402 lack of funds, 422 bad check digit |
//! | `GET /api/user/withdrawals` | yes | 200 list, 204 empty | |
//!
//! Unlisted failures surface as 401 (session) or 500 (anything else).

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
