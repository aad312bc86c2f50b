//! CLI commands

use anyhow::{Result, bail};
use chrono::{DateTime, Local, Utc};
use clap::{Subcommand, ValueEnum};
use luxe_core::types::{Booking, BookingTab, BookingType, Service, ServicePerson};
use luxe_core::{StoreSnapshot, format_zar};
use luxe_http::types::{
    CreateBookingRequest, CreateReviewRequest, ListQuery, ProfileUpdate, RegisterRequest,
    ReportRequest, StartConversationRequest,
};
use luxe_http::{ClientError, PaymentConfig, PaymentIntent};
use tracing::debug;

use crate::session::Session;

/// Shared state handed to every command
pub struct Context {
    pub session: Session,
    pub payment: PaymentConfig,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with your customer account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LUXE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a customer account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LUXE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Update your name or phone number
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Browse services
    Services {
        #[command(flatten)]
        filter: ListArgs,
    },

    /// Show one service
    Service { id: String },

    /// Show a stylist and their reviews
    Stylist { id: String },

    /// Stylists near a location
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Open slots for a stylist on a day
    Slots {
        stylist: String,
        /// Day as YYYY-MM-DD
        date: String,
    },

    /// Book a service
    Book {
        service: String,
        /// Stylist to book, defaults to the service's stylist
        #[arg(long)]
        stylist: Option<String>,
        /// Slot start, as printed by `slots`
        #[arg(long)]
        at: String,
        /// Home visit instead of a salon appointment
        #[arg(long)]
        home: bool,
    },

    /// List your bookings
    Bookings {
        #[arg(long, value_enum, default_value = "all")]
        tab: Tab,
    },

    /// Cancel a pending or accepted booking
    CancelBooking { id: String },

    /// Move a booking to another slot
    Reschedule { id: String, at: String },

    /// Browse products
    Products {
        #[command(flatten)]
        filter: ListArgs,
    },

    /// Manage your cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Prepare payment for the cart
    Checkout,

    /// List your orders
    Orders,

    /// Reviews for a stylist
    Reviews { stylist: String },

    /// Review a completed booking
    Review {
        stylist: String,
        #[arg(long)]
        booking: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long)]
        comment: String,
    },

    /// List conversations
    Conversations,

    /// Show the messages in a conversation
    Messages { conversation: String },

    /// Start a conversation with a stylist
    Contact {
        user: String,
        #[arg(long)]
        booking: Option<String>,
        #[arg(long)]
        order: Option<String>,
    },

    /// Send a message
    Send { conversation: String, text: String },

    /// Number of unread messages
    Unread,

    /// Current promotions
    Promotions,

    /// List favourite services
    Favourites,

    /// Add or remove a favourite service
    Favourite { service: String },

    /// List reports you have filed
    Reports,

    /// Report a problem with a booking or order
    Report {
        #[arg(long)]
        reason: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        booking: Option<String>,
        #[arg(long)]
        order: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CartCommands {
    /// Show the cart
    Show {
        /// Show the locally saved cart instead of the server's
        #[arg(long)]
        local: bool,
    },

    /// Add a product
    Add {
        product: String,
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },

    /// Remove a product
    Remove { product: String },

    /// Change a quantity by a step, e.g. `qty p1 -1`
    Qty {
        product: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<ListArgs> for ListQuery {
    fn from(args: ListArgs) -> Self {
        ListQuery {
            search: args.search.filter(|s| !s.trim().is_empty()),
            page: args.page,
            limit: args.limit,
            ..ListQuery::default()
        }
        .with_category(args.category.as_deref())
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Tab {
    All,
    Upcoming,
    Completed,
    Cancelled,
}

impl From<Tab> for BookingTab {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::All => BookingTab::All,
            Tab::Upcoming => BookingTab::Upcoming,
            Tab::Completed => BookingTab::Completed,
            Tab::Cancelled => BookingTab::Cancelled,
        }
    }
}

/// Whether the failure means the user has to sign in again
pub fn requires_sign_in(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ClientError>()
        .is_some_and(ClientError::requires_sign_in)
}

impl Commands {
    pub async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                let user = ctx.session.login(&email, &password).await?;
                println!("Welcome back, {}!", user.first_name());
            }
            Commands::Register {
                name,
                email,
                password,
                phone,
            } => {
                let request = RegisterRequest::customer(name, email, password, phone);
                let user = ctx.session.register(&request).await?;
                println!("Welcome, {}! Your account is ready.", user.first_name());
            }
            Commands::Logout => {
                ctx.session.logout().await?;
                println!("Signed out.");
            }
            Commands::Whoami => match ctx.session.user() {
                Some(user) if ctx.session.is_signed_in() => {
                    println!("{} <{}>", user.name, user.email);
                    if let Some(phone) = &user.phone {
                        println!("phone: {phone}");
                    }
                }
                _ => println!("Not signed in."),
            },
            Commands::Profile { name, phone } => {
                if name.is_none() && phone.is_none() {
                    bail!("nothing to update: pass --name or --phone");
                }
                let update = ProfileUpdate {
                    name,
                    phone,
                    address: None,
                };
                let user = ctx.session.client().update_profile(&update).await?;
                println!("Profile updated for {}.", user.name);
                ctx.session.update(|snapshot| snapshot.set_user(user))?;
            }
            Commands::Services { filter } => {
                let list = ctx.session.client().services(&filter.into()).await?;
                for service in &list.services {
                    println!("{}", service_line(service));
                }
                print_page(list.pagination.page, list.pagination.pages, list.services.len());
            }
            Commands::Service { id } => {
                let service = ctx.session.client().service(&id).await?;
                print_service(&service);
            }
            Commands::Stylist { id } => {
                let client = ctx.session.client();
                let stylist = client.service_person(&id).await?;
                println!("{}", stylist_line(&stylist));
                if let Some(bio) = &stylist.bio {
                    println!("  {bio}");
                }
                let reviews = client.reviews(&id).await?;
                for review in &reviews.reviews {
                    println!(
                        "  {} {}",
                        stars(review.rating),
                        review.comment.as_deref().unwrap_or("")
                    );
                }
            }
            Commands::Nearby { lat, lng } => {
                let nearby = ctx
                    .session
                    .client()
                    .nearby_service_persons(lat, lng)
                    .await?;
                if nearby.users.is_empty() {
                    println!("No stylists within 20km.");
                }
                for stylist in &nearby.users {
                    println!("{}", stylist_line(stylist));
                }
            }
            Commands::Slots { stylist, date } => {
                let slots = ctx
                    .session
                    .client()
                    .available_slots(&stylist, &date)
                    .await?;
                let mut any = false;
                for slot in slots.available() {
                    any = true;
                    println!(
                        "{}  {}",
                        slot.label.as_deref().unwrap_or(&slot.start),
                        slot.start
                    );
                }
                if !any {
                    println!("No open slots on {date}.");
                }
            }
            Commands::Book {
                service,
                stylist,
                at,
                home,
            } => book(ctx, &service, stylist, at, home).await?,
            Commands::Bookings { tab } => {
                let list = ctx
                    .session
                    .client()
                    .my_bookings(&ListQuery::default())
                    .await?;
                let tab = BookingTab::from(tab);
                let now = Utc::now();
                let shown: Vec<_> = list
                    .bookings
                    .iter()
                    .filter(|booking| tab.includes(booking.status))
                    .collect();
                if shown.is_empty() {
                    println!("No bookings.");
                }
                for booking in shown {
                    println!("{}", booking_line(booking, now));
                }
            }
            Commands::CancelBooking { id } => {
                let client = ctx.session.client();
                let list = client.my_bookings(&ListQuery::default()).await?;
                if let Some(booking) = list.bookings.iter().find(|b| b.id == id)
                    && !booking.can_cancel(Utc::now())
                {
                    bail!("booking {id} is {} and can no longer be cancelled", booking.status);
                }
                let booking = client.cancel_booking(&id).await?;
                println!("Booking {} is now {}.", booking.id, booking.status);
            }
            Commands::Reschedule { id, at } => {
                let booking = ctx.session.client().reschedule_booking(&id, &at).await?;
                println!(
                    "Booking {} moved to {}.",
                    booking.id,
                    booking.date().map_or_else(|| at.clone(), format_date)
                );
            }
            Commands::Products { filter } => {
                let list = ctx.session.client().products(&filter.into()).await?;
                for product in &list.products {
                    let price = if product.on_sale() {
                        format!(
                            "{} (was {})",
                            format_zar(product.display_price()),
                            format_zar(product.price)
                        )
                    } else {
                        format_zar(product.display_price())
                    };
                    println!("{}  {}  {}", product.id, product.name, price);
                }
                print_page(list.pagination.page, list.pagination.pages, list.products.len());
            }
            Commands::Cart { command } => command.execute(ctx).await?,
            Commands::Checkout => {
                ctx.payment.require_key()?;
                let intent = ctx.session.client().checkout().await?;
                ctx.session.update(StoreSnapshot::clear_cart)?;
                println!("Order total {}.", format_zar(intent.amount));
                print_payment(&ctx.payment, &intent);
            }
            Commands::Orders => {
                let list = ctx.session.client().my_orders().await?;
                if list.orders.is_empty() {
                    println!("No orders yet.");
                }
                for order in &list.orders {
                    println!(
                        "{}  {}  {}  {} item(s)  {}",
                        order.id,
                        order.created_at.map(format_date).unwrap_or_default(),
                        order.status,
                        order.items.iter().map(|item| item.quantity).sum::<u32>(),
                        format_zar(order.total_amount.unwrap_or(0))
                    );
                }
            }
            Commands::Reviews { stylist } => {
                let list = ctx.session.client().reviews(&stylist).await?;
                if list.reviews.is_empty() {
                    println!("No reviews yet.");
                }
                for review in &list.reviews {
                    let author = review
                        .customer
                        .as_ref()
                        .and_then(|c| c.populated())
                        .map_or("Customer", |c| c.first_name());
                    println!(
                        "{}  {author}: {}",
                        stars(review.rating),
                        review.comment.as_deref().unwrap_or("")
                    );
                }
            }
            Commands::Review {
                stylist,
                booking,
                rating,
                comment,
            } => {
                let request = CreateReviewRequest {
                    service_person_id: stylist,
                    booking_id: booking,
                    rating,
                    comment,
                };
                ctx.session.client().create_review(&request).await?;
                println!("Thanks for your review.");
            }
            Commands::Conversations => {
                let conversations = ctx.session.client().conversations().await?;
                let me = ctx.session.user().map(|u| u.id.clone()).unwrap_or_default();
                for conversation in &conversations {
                    let with: Vec<_> = conversation
                        .participants
                        .iter()
                        .filter(|p| p.id() != me)
                        .map(|p| p.populated().map_or(p.id(), |u| u.name.as_str()))
                        .collect();
                    println!("{}  {}", conversation.id, with.join(", "));
                }
            }
            Commands::Messages { conversation } => {
                let list = ctx.session.client().messages(&conversation).await?;
                for message in &list.messages {
                    let sender = message
                        .sender
                        .as_ref()
                        .map(|s| s.populated().map_or(s.id(), |u| u.first_name()))
                        .unwrap_or("?");
                    println!(
                        "[{}] {sender}: {}",
                        message.created_at.map(format_date).unwrap_or_default(),
                        message.text
                    );
                }
            }
            Commands::Contact {
                user,
                booking,
                order,
            } => {
                let kind = match (&booking, &order) {
                    (Some(_), _) => Some("booking".to_string()),
                    (None, Some(_)) => Some("order".to_string()),
                    (None, None) => None,
                };
                let request = StartConversationRequest {
                    target_user_id: user,
                    booking_id: booking,
                    order_id: order,
                    kind,
                };
                let conversation = ctx.session.client().start_conversation(&request).await?;
                println!("Conversation {} started.", conversation.id);
            }
            Commands::Send { conversation, text } => {
                if text.trim().is_empty() {
                    bail!("message is empty");
                }
                ctx.session
                    .client()
                    .send_message(&conversation, &text)
                    .await?;
                println!("Sent.");
            }
            Commands::Unread => {
                let count = ctx.session.client().unread_count().await?;
                println!("{count} unread message(s)");
            }
            Commands::Promotions => {
                let list = ctx.session.client().active_promotions().await?;
                if list.promotions.is_empty() {
                    println!("No promotions right now.");
                }
                for promotion in &list.promotions {
                    let code = promotion
                        .code
                        .as_deref()
                        .map(|c| format!("  code {c}"))
                        .unwrap_or_default();
                    println!("{}{code}", promotion.title);
                    if let Some(description) = &promotion.description {
                        println!("  {description}");
                    }
                }
            }
            Commands::Favourites => {
                let list = ctx.session.client().favourites().await?;
                if list.favourites.is_empty() {
                    println!("No favourites yet.");
                }
                for favourite in &list.favourites {
                    match favourite.populated() {
                        Some(service) => println!("{}", service_line(service)),
                        None => println!("{}", favourite.id()),
                    }
                }
            }
            Commands::Favourite { service } => {
                let client = ctx.session.client();
                client.toggle_favourite(&service).await?;
                let list = client.favourites().await?;
                if list.favourites.iter().any(|f| f.id() == service) {
                    println!("Added {service} to favourites.");
                } else {
                    println!("Removed {service} from favourites.");
                }
            }
            Commands::Reports => {
                let list = ctx.session.client().my_reports().await?;
                if list.reports.is_empty() {
                    println!("No reports filed.");
                }
                for report in &list.reports {
                    println!(
                        "{}  {}  {}",
                        report.id,
                        report.status.as_deref().unwrap_or("open"),
                        report.reason.as_deref().unwrap_or("")
                    );
                }
            }
            Commands::Report {
                reason,
                description,
                booking,
                order,
            } => {
                let request = ReportRequest {
                    reason,
                    description,
                    booking_id: booking,
                    order_id: order,
                };
                let report = ctx.session.client().submit_report(&request).await?;
                println!("Report {} filed. We will be in touch.", report.id);
            }
        }

        Ok(())
    }
}

impl CartCommands {
    pub async fn execute(self, ctx: &mut Context) -> Result<()> {
        match self {
            CartCommands::Show { local: true } => {
                let snapshot = ctx.session.snapshot();
                for line in &snapshot.cart {
                    println!(
                        "{}  {} x{}  {}",
                        line.product_id,
                        line.name,
                        line.quantity,
                        format_zar(line.line_total())
                    );
                }
                println!(
                    "{} item(s), subtotal {}",
                    snapshot.cart_count(),
                    format_zar(snapshot.cart_subtotal())
                );
            }
            CartCommands::Show { local: false } => {
                let cart = ctx.session.client().cart().await?;
                for item in &cart.items {
                    let name = item
                        .product
                        .populated()
                        .map_or(item.product.id(), |p| p.name.as_str());
                    println!(
                        "{}  {} x{}  {}",
                        item.product.id(),
                        name,
                        item.quantity,
                        format_zar(item.unit_price() * i64::from(item.quantity))
                    );
                }
                println!(
                    "{} item(s), subtotal {}",
                    cart.count(),
                    format_zar(cart.subtotal())
                );
            }
            CartCommands::Add { product, qty } => {
                if qty == 0 {
                    bail!("quantity must be at least 1");
                }
                let client = ctx.session.client();
                let product = client.product(&product).await?;
                client.add_cart_item(&product.id, qty).await?;
                println!("Added {} x{} to your cart.", product.name, qty);
                let item = product.to_cart_item(qty);
                ctx.session
                    .update(|snapshot| snapshot.add_to_cart(item, Some(qty)))?;
            }
            CartCommands::Remove { product } => {
                ctx.session.client().remove_cart_item(&product).await?;
                ctx.session
                    .update(|snapshot| snapshot.remove_from_cart(&product))?;
                println!("Removed {product} from your cart.");
            }
            CartCommands::Qty { product, delta } => {
                let client = ctx.session.client();
                let quantity = client.adjust_cart_item(&product, delta).await?;
                debug!(product = %product, quantity, "Cart line adjusted");

                let mirrored = ctx
                    .session
                    .snapshot()
                    .cart
                    .iter()
                    .any(|line| line.product_id == product);
                if quantity == 0 || mirrored {
                    ctx.session
                        .update(|snapshot| snapshot.update_qty(&product, i64::from(quantity)))?;
                } else {
                    let item = client.product(&product).await?.to_cart_item(quantity);
                    ctx.session
                        .update(|snapshot| snapshot.add_to_cart(item, Some(quantity)))?;
                }

                if quantity == 0 {
                    println!("Removed {product} from your cart.");
                } else {
                    println!("{product} quantity is now {quantity}.");
                }
            }
        }

        Ok(())
    }
}

async fn book(
    ctx: &mut Context,
    service_id: &str,
    stylist: Option<String>,
    at: String,
    home: bool,
) -> Result<()> {
    let client = ctx.session.client();
    let service = client.service(service_id).await?;

    let booking_type = if home {
        if !service.is_home_service {
            bail!("{} is only offered at the salon", service.name);
        }
        BookingType::Home
    } else {
        BookingType::Salon
    };

    let Some(stylist) = stylist.or_else(|| {
        service
            .service_person
            .as_ref()
            .map(|sp| sp.id().to_string())
    }) else {
        bail!("{} has no stylist assigned; pass --stylist", service.name);
    };

    let request = CreateBookingRequest {
        service_person_id: stylist,
        service_ids: vec![service.id.clone()],
        booking_date: at,
        booking_type,
    };
    let created = client.create_booking(&request).await?;
    let intent = created.payment_intent(service.total_for(booking_type));

    println!(
        "Booked {} ({}), total {}.",
        service.name,
        created.booking.status,
        format_zar(intent.amount)
    );
    print_payment(&ctx.payment, &intent);
    Ok(())
}

fn print_payment(payment: &PaymentConfig, intent: &PaymentIntent) {
    if payment.is_enabled() {
        println!("Complete payment with client secret: {}", intent.client_secret);
    } else {
        println!(
            "Card payments are not configured. Set LUXE_STRIPE_PUBLISHABLE_KEY to pay online."
        );
    }
}

fn print_page(page: u32, pages: u32, shown: usize) {
    if shown == 0 {
        println!("Nothing found.");
    } else if pages > 1 {
        println!("page {page} of {pages}");
    }
}

fn print_service(service: &Service) {
    println!("{}", service_line(service));
    if let Some(description) = &service.description {
        println!("  {description}");
    }
    if let Some(minutes) = service.duration_minutes {
        println!("  {minutes} min");
    }
    if service.is_home_service {
        println!(
            "  home visits available, {} including call-out",
            format_zar(service.total_for(BookingType::Home))
        );
    }
    if let Some(stylist) = service.service_person.as_ref().and_then(|sp| sp.populated()) {
        println!("  with {}", stylist_line(stylist));
    }
}

fn service_line(service: &Service) -> String {
    format!(
        "{}  {}  {}",
        service.id,
        service.name,
        format_zar(service.display_price())
    )
}

fn stylist_line(stylist: &ServicePerson) -> String {
    let mut line = format!("{}  {}", stylist.id, stylist.name);
    if let Some(specialization) = &stylist.specialization {
        line.push_str(&format!(" ({specialization})"));
    }
    if let Some(rating) = stylist.rating {
        line.push_str(&format!("  {rating:.1}/5"));
    }
    line
}

fn booking_line(booking: &Booking, now: DateTime<Utc>) -> String {
    let services: Vec<_> = booking
        .services
        .iter()
        .map(|s| s.populated().map_or(s.id(), |svc| svc.name.as_str()))
        .collect();
    let mut line = format!(
        "{}  {}  {}  {}",
        booking.id,
        booking.date().map(format_date).unwrap_or_default(),
        booking.status,
        services.join(", ")
    );
    if let Some(total) = booking.total_amount {
        line.push_str(&format!("  {}", format_zar(total)));
    }
    if booking.can_cancel(now) {
        line.push_str("  [cancellable]");
    }
    line
}

fn format_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%a %d %b %Y %H:%M")
        .to_string()
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
