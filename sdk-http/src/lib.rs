/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Protocol-agnostic HTTP plumbing: the request/response envelope that
//! flows through the middleware chain, the type-keyed property bag
//! carried alongside it, and the traits middleware and response parsers
//! implement against.

pub mod body;
pub mod endpoint;
pub mod middleware;
pub mod operation;
pub mod property_bag;
pub mod response;
pub mod result;

pub use body::SdkBody;
pub use operation::Request;
pub use property_bag::PropertyBag;
pub use result::{SdkError, SdkSuccess};
